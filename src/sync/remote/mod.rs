// ABOUTME: Client for the authoritative remote assignment store with optimistic version checks
// ABOUTME: Bounded calls, Unreachable vs NotFound distinction, push subscriptions with echo filtering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Remote Sync Client
//!
//! [`RemoteStore`] is the transport seam: backends only move documents and
//! report transport failures as [`AppError`]s. [`RemoteSyncClient`] turns
//! those into the outcomes the orchestrator branches on, applies the remote
//! timeout to every call and remembers which versions this actor committed.

/// HTTP + SSE backend
pub mod http;
/// In-process backend
pub mod memory;
/// SSE frame parser
pub mod sse;

pub use http::HttpRemoteStore;
pub use memory::InMemoryRemoteStore;

use super::echo::EchoGuard;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{Actor, WorkoutAssignment};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Result of a conditional write as reported by a backend
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteWrite {
    /// Accepted; the store assigned `version`
    Committed {
        /// New document version
        version: u64,
    },
    /// The store holds a different version than expected
    Conflict {
        /// Document currently held by the store
        current: Box<WorkoutAssignment>,
    },
}

/// Transport to the authoritative store
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    /// Active assignment for a client, `None` if the client has none
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure
    async fn fetch_assignment(&self, client_id: Uuid) -> AppResult<Option<WorkoutAssignment>>;

    /// Replace the document if the store is still at `expected_version`
    ///
    /// On success the store increments the version and attributes it to `actor`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or if the assignment does not exist
    async fn write_assignment(
        &self,
        assignment_id: Uuid,
        document: &WorkoutAssignment,
        expected_version: u64,
        actor: Actor,
    ) -> AppResult<RemoteWrite>;

    /// Open a push channel of changed documents, `None` if push is unavailable
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure
    async fn subscribe(
        &self,
        assignment_id: Uuid,
    ) -> AppResult<Option<mpsc::Receiver<WorkoutAssignment>>>;
}

/// Outcome of [`RemoteSyncClient::fetch_latest`]
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Current document
    Found(WorkoutAssignment),
    /// The client legitimately has no assignment
    NotFound,
    /// Failed or timed out
    Unreachable(String),
}

/// Outcome of [`RemoteSyncClient::write_if_version_matches`]
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// Accepted at `version`
    Committed {
        /// New document version
        version: u64,
    },
    /// Another actor wrote first
    Conflict {
        /// Version the store is at
        current_version: u64,
        /// Document to use as the new base
        current: Box<WorkoutAssignment>,
    },
    /// The assignment no longer exists remotely
    NotFound,
    /// Failed or timed out
    Unreachable(String),
}

/// Remote client bound to one actor
pub struct RemoteSyncClient<R: RemoteStore> {
    store: Arc<R>,
    timeout: Duration,
    echo: Arc<EchoGuard>,
}

impl<R: RemoteStore> RemoteSyncClient<R> {
    /// Create a client writing as `actor`
    #[must_use]
    pub fn new(store: Arc<R>, actor: Actor, timeout: Duration) -> Self {
        Self {
            store,
            timeout,
            echo: Arc::new(EchoGuard::new(actor)),
        }
    }

    /// Actor writes are attributed to
    #[must_use]
    pub fn actor(&self) -> Actor {
        self.echo.actor()
    }

    /// Echo guard fed by this client's commits
    #[must_use]
    pub fn echo_guard(&self) -> &EchoGuard {
        &self.echo
    }

    /// Backend handle
    #[must_use]
    pub fn store(&self) -> &Arc<R> {
        &self.store
    }

    async fn bounded<T>(&self, op: &str, call: impl Future<Output = AppResult<T>>) -> AppResult<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or_else(|_| {
                Err(AppError::remote_unreachable(format!(
                    "{op} timed out after {}ms",
                    self.timeout.as_millis()
                )))
            })
    }

    /// Fetch the active assignment for a client
    pub async fn fetch_latest(&self, client_id: Uuid) -> FetchOutcome {
        match self
            .bounded("fetch", self.store.fetch_assignment(client_id))
            .await
        {
            Ok(Some(document)) => FetchOutcome::Found(document),
            Ok(None) => FetchOutcome::NotFound,
            Err(e) if e.code == ErrorCode::ResourceNotFound => FetchOutcome::NotFound,
            Err(e) => {
                warn!(client_id = %client_id, error = %e, "Remote fetch failed");
                FetchOutcome::Unreachable(e.message)
            }
        }
    }

    /// Write `document` if the store is still at `expected_version`
    pub async fn write_if_version_matches(
        &self,
        assignment_id: Uuid,
        document: &WorkoutAssignment,
        expected_version: u64,
    ) -> WriteOutcome {
        let actor = self.actor();
        let result = self
            .bounded(
                "write",
                self.store
                    .write_assignment(assignment_id, document, expected_version, actor),
            )
            .await;

        match result {
            Ok(RemoteWrite::Committed { version }) => {
                self.echo.record_own_write(version);
                debug!(assignment_id = %assignment_id, version, actor = %actor, "Remote write committed");
                WriteOutcome::Committed { version }
            }
            Ok(RemoteWrite::Conflict { current }) => {
                debug!(
                    assignment_id = %assignment_id,
                    expected_version,
                    current_version = current.version,
                    "Remote write conflicted"
                );
                WriteOutcome::Conflict {
                    current_version: current.version,
                    current,
                }
            }
            Err(e) if e.code == ErrorCode::ResourceNotFound => WriteOutcome::NotFound,
            Err(e) => {
                warn!(assignment_id = %assignment_id, error = %e, "Remote write failed");
                WriteOutcome::Unreachable(e.message)
            }
        }
    }

    /// Subscribe to changes of one assignment, `None` when no push channel is available
    pub async fn subscribe(&self, assignment_id: Uuid) -> Option<RemoteSubscription> {
        match self
            .bounded("subscribe", self.store.subscribe(assignment_id))
            .await
        {
            Ok(Some(receiver)) => Some(RemoteSubscription {
                assignment_id,
                receiver: Some(receiver),
                echo: Arc::clone(&self.echo),
            }),
            Ok(None) => {
                debug!(assignment_id = %assignment_id, "Push channel unavailable, polling instead");
                None
            }
            Err(e) => {
                warn!(assignment_id = %assignment_id, error = %e, "Push subscription failed, polling instead");
                None
            }
        }
    }
}

/// Live push subscription that drops this actor's own echoes
pub struct RemoteSubscription {
    assignment_id: Uuid,
    receiver: Option<mpsc::Receiver<WorkoutAssignment>>,
    echo: Arc<EchoGuard>,
}

impl RemoteSubscription {
    /// Next change made by someone else; `None` once closed or unsubscribed
    pub async fn recv(&mut self) -> Option<WorkoutAssignment> {
        loop {
            let document = self.receiver.as_mut()?.recv().await;
            let Some(document) = document else {
                self.receiver = None;
                return None;
            };
            if self.echo.is_echo(&document) {
                debug!(
                    assignment_id = %self.assignment_id,
                    version = document.version,
                    "Suppressed self-echo push"
                );
                continue;
            }
            return Some(document);
        }
    }

    /// Assignment this subscription follows
    #[must_use]
    pub const fn assignment_id(&self) -> Uuid {
        self.assignment_id
    }

    /// Whether deliveries can still arrive
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.receiver.is_some()
    }

    /// Stop deliveries; safe to call any number of times
    pub fn unsubscribe(&mut self) {
        if let Some(mut receiver) = self.receiver.take() {
            receiver.close();
            debug!(assignment_id = %self.assignment_id, "Unsubscribed from assignment changes");
        }
    }
}

impl Drop for RemoteSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
