// ABOUTME: In-process authoritative assignment store with optimistic versioning and push fan-out
// ABOUTME: Switches for reachability, push availability and latency drive degraded-mode scenarios
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{RemoteStore, RemoteWrite};
use crate::constants::sync::PUSH_CHANNEL_CAPACITY;
use crate::errors::{AppError, AppResult};
use crate::models::{Actor, WorkoutAssignment};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Authoritative store living in this process
///
/// Versions are assigned by the store: a committed write lands at
/// `expected_version + 1`, attributed to the writing actor.
pub struct InMemoryRemoteStore {
    assignments: RwLock<HashMap<Uuid, WorkoutAssignment>>,
    active_by_client: RwLock<HashMap<Uuid, Uuid>>,
    channels: DashMap<Uuid, broadcast::Sender<WorkoutAssignment>>,
    commit_log: RwLock<Vec<(u64, Actor)>>,
    reachable: AtomicBool,
    push_enabled: AtomicBool,
    latency_ms: AtomicU64,
}

impl Default for InMemoryRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRemoteStore {
    /// Empty, reachable store with push enabled
    #[must_use]
    pub fn new() -> Self {
        Self {
            assignments: RwLock::new(HashMap::new()),
            active_by_client: RwLock::new(HashMap::new()),
            channels: DashMap::new(),
            commit_log: RwLock::new(Vec::new()),
            reachable: AtomicBool::new(true),
            push_enabled: AtomicBool::new(true),
            latency_ms: AtomicU64::new(0),
        }
    }

    /// Seed or replace an assignment as-is and make it the client's active one
    pub async fn insert_assignment(&self, assignment: WorkoutAssignment) {
        self.active_by_client
            .write()
            .await
            .insert(assignment.client_id, assignment.id);
        self.assignments
            .write()
            .await
            .insert(assignment.id, assignment);
    }

    /// Current document by assignment id, bypassing switches
    pub async fn assignment(&self, assignment_id: Uuid) -> Option<WorkoutAssignment> {
        self.assignments.read().await.get(&assignment_id).cloned()
    }

    /// Open push subscriptions for an assignment
    #[must_use]
    pub fn subscriber_count(&self, assignment_id: Uuid) -> usize {
        self.channels
            .get(&assignment_id)
            .map_or(0, |sender| sender.receiver_count())
    }

    /// Every committed (version, actor) in commit order
    pub async fn commit_log(&self) -> Vec<(u64, Actor)> {
        self.commit_log.read().await.clone()
    }

    /// Simulate the store going away or coming back
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::Release);
    }

    /// Enable or disable push; disabling closes every open subscription
    pub fn set_push_enabled(&self, enabled: bool) {
        self.push_enabled.store(enabled, Ordering::Release);
        if !enabled {
            self.channels.clear();
        }
    }

    /// Delay applied before every call
    pub fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(millis, Ordering::Release);
    }

    async fn enter(&self) -> AppResult<()> {
        let latency = self.latency_ms.load(Ordering::Acquire);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.reachable.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(AppError::remote_unreachable("in-memory remote is offline"))
        }
    }

    fn publish(&self, document: &WorkoutAssignment) {
        if let Some(sender) = self.channels.get(&document.id) {
            // No receivers is fine
            let _ = sender.send(document.clone());
        }
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn fetch_assignment(&self, client_id: Uuid) -> AppResult<Option<WorkoutAssignment>> {
        self.enter().await?;
        let Some(assignment_id) = self.active_by_client.read().await.get(&client_id).copied()
        else {
            return Ok(None);
        };
        Ok(self.assignments.read().await.get(&assignment_id).cloned())
    }

    async fn write_assignment(
        &self,
        assignment_id: Uuid,
        document: &WorkoutAssignment,
        expected_version: u64,
        actor: Actor,
    ) -> AppResult<RemoteWrite> {
        self.enter().await?;

        let committed = {
            let mut assignments = self.assignments.write().await;
            let current = assignments
                .get_mut(&assignment_id)
                .ok_or_else(|| AppError::not_found(format!("assignment {assignment_id}")))?;

            if current.version != expected_version {
                return Ok(RemoteWrite::Conflict {
                    current: Box::new(current.clone()),
                });
            }

            let mut next = document.clone();
            next.id = assignment_id;
            next.stamp(expected_version + 1, actor);
            *current = next.clone();
            self.commit_log.write().await.push((next.version, actor));
            next
        };

        debug!(
            assignment_id = %assignment_id,
            version = committed.version,
            actor = %actor,
            "In-memory remote committed write"
        );
        self.publish(&committed);
        Ok(RemoteWrite::Committed {
            version: committed.version,
        })
    }

    async fn subscribe(
        &self,
        assignment_id: Uuid,
    ) -> AppResult<Option<mpsc::Receiver<WorkoutAssignment>>> {
        self.enter().await?;
        if !self.push_enabled.load(Ordering::Acquire) {
            return Ok(None);
        }

        let mut changes = self
            .channels
            .entry(assignment_id)
            .or_insert_with(|| broadcast::channel(PUSH_CHANNEL_CAPACITY).0)
            .subscribe();
        let (tx, rx) = mpsc::channel(PUSH_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = tx.closed() => break,
                    change = changes.recv() => match change {
                        Ok(document) => {
                            if tx.send(document).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            debug!(skipped, "Push subscriber lagged, older changes dropped");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });

        Ok(Some(rx))
    }
}
