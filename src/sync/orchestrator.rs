// ABOUTME: Per-client controller reconciling the remote store, the local cache and pending edits
// ABOUTME: Drives the Synced/LocalOnly/Conflict state machine and publishes change events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Sync Orchestrator
//!
//! One orchestrator per (client, actor). Every state-changing path (load,
//! mutation, poll tick, push delivery) runs under a FIFO write lock, so writes
//! reach the remote store in the order they were issued and cache
//! read-modify-write cycles never interleave.
//!
//! Source of truth resolution is always remote, then local cache, then the
//! caller-supplied fallback document.

use super::mutation::{self, SetEdit};
use super::remote::{FetchOutcome, RemoteStore, RemoteSubscription, RemoteSyncClient, WriteOutcome};
use super::versioned_store::VersionedDocumentStore;
use super::watcher::Watcher;
use crate::cache::CacheProvider;
use crate::config::SyncConfig;
use crate::errors::{SyncError, SyncResult};
use crate::models::{Actor, ExercisePerformance, WeeklyPerformance, WorkoutAssignment};
use crate::performance::{ExerciseRecord, PerformanceAggregator};
use crate::progression;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Where the orchestrator currently takes its truth from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncState {
    /// Nothing loaded yet
    Uninitialized,
    /// First fetch in flight
    Loading,
    /// Consistent with the remote store
    Synced,
    /// Remote unreachable; cache (and pending edits) in use
    LocalOnly,
    /// A write hit a newer remote version
    Conflict,
}

/// What produced an assignment update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeOrigin {
    /// This actor's own edit
    Local,
    /// Fetched from the remote store
    Remote,
    /// Delivered over the push channel
    Push,
    /// Read from the local cache
    Cache,
    /// Caller-supplied default
    Fallback,
}

/// Notification for presentation layers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SyncEvent {
    /// Sync state transition
    StateChanged {
        /// Previous state
        from: SyncState,
        /// New state
        to: SyncState,
    },
    /// The working assignment changed
    AssignmentUpdated {
        /// Version of the new working copy (tentative while pending)
        version: u64,
        /// Cause of the change
        origin: ChangeOrigin,
    },
    /// The client no longer has an active assignment
    AssignmentCleared,
    /// A write was based on a stale version
    ConflictDetected {
        /// Version the write assumed
        expected_version: u64,
        /// Version the remote store holds
        current_version: u64,
    },
    /// A pending local edit was dropped in favor of the remote document
    PendingDiscarded {
        /// Tentative version of the dropped edit
        discarded_version: u64,
        /// Remote version that won, if the assignment still exists
        remote_version: Option<u64>,
    },
    /// A pending local edit reached the remote store
    PendingFlushed {
        /// Version the remote store assigned
        version: u64,
    },
    /// Exercise performance was recorded
    PerformanceRecorded {
        /// Program week
        week_number: u32,
        /// Exercise recorded
        exercise_id: String,
        /// Exercise volume after the update
        total_volume: f64,
    },
}

/// Result of `load_assignment`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedAssignment {
    /// Working copy, `None` when the client has no assignment
    pub assignment: Option<WorkoutAssignment>,
    /// Reachable weeks
    pub unlocked_weeks: BTreeSet<u32>,
    /// State after loading
    pub sync_state: SyncState,
}

/// How a mutation was persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MutationOutcome {
    /// Accepted by the remote store
    Committed {
        /// Version assigned by the remote store
        version: u64,
    },
    /// Stored locally, flushed once the remote store is reachable
    Pending {
        /// Tentative local version
        local_version: u64,
    },
}

struct SessionState {
    sync_state: SyncState,
    assignment: Option<WorkoutAssignment>,
    // last version known to be committed remotely; base for the next write
    remote_version: u64,
    pending: bool,
}

/// Shared state reached by both the public handle and the background watcher
pub(super) struct SyncCore<R: RemoteStore, C: CacheProvider> {
    client_id: Uuid,
    remote: RemoteSyncClient<R>,
    store: VersionedDocumentStore<C>,
    performance: Arc<PerformanceAggregator<C>>,
    config: SyncConfig,
    state: RwLock<SessionState>,
    write_lock: Mutex<()>,
    events: broadcast::Sender<SyncEvent>,
}

impl<R: RemoteStore, C: CacheProvider> SyncCore<R, C> {
    fn emit(&self, event: SyncEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    async fn set_state(&self, to: SyncState) {
        let from = {
            let mut state = self.state.write().await;
            let from = state.sync_state;
            state.sync_state = to;
            from
        };
        if from != to {
            info!(client_id = %self.client_id, ?from, ?to, "Sync state changed");
            self.emit(SyncEvent::StateChanged { from, to });
        }
    }

    pub(super) async fn sync_state(&self) -> SyncState {
        self.state.read().await.sync_state
    }

    async fn assignment_id(&self) -> Option<Uuid> {
        self.state.read().await.assignment.as_ref().map(|d| d.id)
    }

    /// Poll even with a live push channel while edits wait to be flushed
    pub(super) async fn needs_poll(&self) -> bool {
        let state = self.state.read().await;
        state.pending || state.sync_state == SyncState::LocalOnly
    }

    pub(super) async fn open_subscription(&self) -> Option<RemoteSubscription> {
        let assignment_id = self.assignment_id().await?;
        self.remote.subscribe(assignment_id).await
    }

    pub(super) async fn current_assignment_id(&self) -> Option<Uuid> {
        self.assignment_id().await
    }

    async fn snapshot(&self) -> LoadedAssignment {
        let state = self.state.read().await;
        let unlocked_weeks = state.assignment.as_ref().map_or_else(
            || progression::resolve_unlocked_weeks(&[]),
            |doc| progression::resolve_unlocked_weeks(&doc.weeks),
        );
        LoadedAssignment {
            assignment: state.assignment.clone(),
            unlocked_weeks,
            sync_state: state.sync_state,
        }
    }

    /// Install a remote document as the working copy without touching the sync state
    async fn store_remote(&self, document: WorkoutAssignment, origin: ChangeOrigin) {
        let version = document.version;
        if let Err(e) = self
            .store
            .put(&document, version, document.last_modified_by)
            .await
        {
            warn!(client_id = %self.client_id, error = %e, "Could not cache remote document, continuing in memory");
        }
        {
            let mut state = self.state.write().await;
            state.assignment = Some(document);
            state.remote_version = version;
            state.pending = false;
        }
        self.emit(SyncEvent::AssignmentUpdated { version, origin });
    }

    async fn adopt_remote(&self, document: WorkoutAssignment, origin: ChangeOrigin) {
        self.store_remote(document, origin).await;
        self.set_state(SyncState::Synced).await;
    }

    async fn commit_local(&self, mut document: WorkoutAssignment, version: u64) {
        let actor = self.remote.actor();
        document.stamp(version, actor);
        if let Err(e) = self.store.put(&document, version, actor).await {
            warn!(client_id = %self.client_id, error = %e, "Could not cache committed document, continuing in memory");
        }
        {
            let mut state = self.state.write().await;
            state.assignment = Some(document);
            state.remote_version = version;
            state.pending = false;
        }
        self.emit(SyncEvent::AssignmentUpdated {
            version,
            origin: ChangeOrigin::Local,
        });
        self.set_state(SyncState::Synced).await;
    }

    async fn stage_pending(&self, mut document: WorkoutAssignment, base: u64) -> MutationOutcome {
        let actor = self.remote.actor();
        let local_version = document.version.max(base) + 1;
        document.stamp(local_version, actor);
        if let Err(e) = self.store.put_pending(&document, base, actor).await {
            warn!(client_id = %self.client_id, error = %e, "Could not cache pending edit, keeping it in memory only");
        }
        {
            let mut state = self.state.write().await;
            state.assignment = Some(document);
            state.remote_version = base;
            state.pending = true;
        }
        debug!(client_id = %self.client_id, local_version, base, "Staged pending local edit");
        self.emit(SyncEvent::AssignmentUpdated {
            version: local_version,
            origin: ChangeOrigin::Local,
        });
        self.set_state(SyncState::LocalOnly).await;
        MutationOutcome::Pending { local_version }
    }

    async fn clear_assignment(&self) {
        let (had_assignment, pending_version) = {
            let mut state = self.state.write().await;
            let pending_version = state
                .pending
                .then(|| state.assignment.as_ref().map(|d| d.version))
                .flatten();
            let had_assignment = state.assignment.take().is_some();
            state.remote_version = 0;
            state.pending = false;
            (had_assignment, pending_version)
        };
        if let Err(e) = self.store.remove(self.client_id).await {
            warn!(client_id = %self.client_id, error = %e, "Could not clear cached assignment");
        }
        if let Some(discarded_version) = pending_version {
            warn!(client_id = %self.client_id, "Assignment removed remotely, dropping pending edit");
            self.emit(SyncEvent::PendingDiscarded {
                discarded_version,
                remote_version: None,
            });
        }
        if had_assignment {
            self.emit(SyncEvent::AssignmentCleared);
        }
        self.set_state(SyncState::Synced).await;
    }

    /// Pending edit to flush, from the session or, before anything is loaded, from the cache
    async fn pending_candidate(&self) -> Option<(WorkoutAssignment, u64)> {
        {
            let state = self.state.read().await;
            if state.pending {
                return state
                    .assignment
                    .clone()
                    .map(|doc| (doc, state.remote_version));
            }
            if state.assignment.is_some() {
                return None;
            }
        }
        self.store
            .load_or_absent(self.client_id)
            .await
            .filter(|entry| entry.pending)
            .map(|entry| (entry.document, entry.base_version))
    }

    async fn flush(&self, pending: WorkoutAssignment, base: u64, remote_hint: Option<WorkoutAssignment>) {
        match self
            .remote
            .write_if_version_matches(pending.id, &pending, base)
            .await
        {
            WriteOutcome::Committed { version } => {
                info!(client_id = %self.client_id, version, "Flushed pending local edit");
                self.commit_local(pending, version).await;
                self.emit(SyncEvent::PendingFlushed { version });
            }
            WriteOutcome::Conflict {
                current_version,
                current,
            } => {
                warn!(
                    client_id = %self.client_id,
                    base,
                    current_version,
                    "Pending local edit conflicts with a newer remote version, discarding it"
                );
                self.emit(SyncEvent::PendingDiscarded {
                    discarded_version: pending.version,
                    remote_version: Some(current_version),
                });
                self.adopt_remote(*current, ChangeOrigin::Remote).await;
            }
            WriteOutcome::NotFound => {
                warn!(client_id = %self.client_id, "Pending edit targets a missing assignment, discarding it");
                self.emit(SyncEvent::PendingDiscarded {
                    discarded_version: pending.version,
                    remote_version: remote_hint.as_ref().map(|d| d.version),
                });
                match remote_hint {
                    Some(document) => self.adopt_remote(document, ChangeOrigin::Remote).await,
                    None => self.clear_assignment().await,
                }
            }
            WriteOutcome::Unreachable(reason) => {
                debug!(client_id = %self.client_id, %reason, "Flush deferred, remote unreachable");
                {
                    let mut state = self.state.write().await;
                    if !state.pending {
                        state.assignment = Some(pending);
                        state.remote_version = base;
                        state.pending = true;
                    }
                }
                self.set_state(SyncState::LocalOnly).await;
            }
        }
    }

    /// Bring the session in line with a document read from the remote store
    async fn reconcile(&self, remote_doc: WorkoutAssignment, origin: ChangeOrigin) {
        if let Some((pending, base)) = self.pending_candidate().await {
            if pending.id == remote_doc.id {
                self.flush(pending, base, Some(remote_doc)).await;
                return;
            }
            warn!(client_id = %self.client_id, "Active assignment replaced while an edit was pending, discarding it");
            self.emit(SyncEvent::PendingDiscarded {
                discarded_version: pending.version,
                remote_version: Some(remote_doc.version),
            });
            self.adopt_remote(remote_doc, origin).await;
            return;
        }

        let unchanged = {
            let state = self.state.read().await;
            state.assignment.as_ref().is_some_and(|known| {
                known.id == remote_doc.id
                    && (remote_doc.version < state.remote_version
                        || (remote_doc.version == state.remote_version
                            && known.same_content(&remote_doc)))
            })
        };

        if unchanged {
            if self.remote.echo_guard().is_echo(&remote_doc) {
                debug!(client_id = %self.client_id, version = remote_doc.version, "Suppressed self-echo");
            } else {
                debug!(client_id = %self.client_id, version = remote_doc.version, "Remote document unchanged");
            }
            self.set_state(SyncState::Synced).await;
            return;
        }

        self.adopt_remote(remote_doc, origin).await;
    }

    async fn load_local(&self, fallback: Option<WorkoutAssignment>) {
        let session_has_doc = self.state.read().await.assignment.is_some();
        if !session_has_doc {
            let loaded = match self.store.load_or_absent(self.client_id).await {
                Some(entry) => Some((entry.document, entry.base_version, entry.pending, ChangeOrigin::Cache)),
                None => fallback.map(|doc| {
                    let version = doc.version;
                    (doc, version, false, ChangeOrigin::Fallback)
                }),
            };
            if let Some((document, remote_version, pending, origin)) = loaded {
                let version = document.version;
                {
                    let mut state = self.state.write().await;
                    state.assignment = Some(document);
                    state.remote_version = remote_version;
                    state.pending = pending;
                }
                self.emit(SyncEvent::AssignmentUpdated { version, origin });
            }
        }
        self.set_state(SyncState::LocalOnly).await;
    }

    async fn load(&self, fallback: Option<WorkoutAssignment>) -> LoadedAssignment {
        let _guard = self.write_lock.lock().await;
        self.set_state(SyncState::Loading).await;

        match self.remote.fetch_latest(self.client_id).await {
            FetchOutcome::Found(document) => {
                info!(client_id = %self.client_id, version = document.version, "Loaded assignment from remote store");
                self.reconcile(document, ChangeOrigin::Remote).await;
            }
            FetchOutcome::NotFound => {
                info!(client_id = %self.client_id, "Client has no active assignment");
                self.clear_assignment().await;
            }
            FetchOutcome::Unreachable(reason) => {
                warn!(client_id = %self.client_id, %reason, "Remote store unreachable, falling back to local cache");
                self.load_local(fallback).await;
            }
        }

        self.snapshot().await
    }

    pub(super) async fn poll_once(&self) -> SyncState {
        let _guard = self.write_lock.lock().await;
        match self.remote.fetch_latest(self.client_id).await {
            FetchOutcome::Found(document) => self.reconcile(document, ChangeOrigin::Remote).await,
            FetchOutcome::NotFound => self.clear_assignment().await,
            FetchOutcome::Unreachable(reason) => {
                debug!(client_id = %self.client_id, %reason, "Poll tick could not reach remote store");
                if matches!(self.sync_state().await, SyncState::Synced | SyncState::Conflict) {
                    self.set_state(SyncState::LocalOnly).await;
                }
            }
        }
        self.sync_state().await
    }

    pub(super) async fn handle_remote_change(&self, document: WorkoutAssignment) {
        if document.client_id != self.client_id {
            debug!(client_id = %self.client_id, "Ignoring push for another client");
            return;
        }
        if self.remote.echo_guard().is_echo(&document) {
            debug!(client_id = %self.client_id, version = document.version, "Suppressed self-echo push");
            return;
        }
        let _guard = self.write_lock.lock().await;
        self.reconcile(document, ChangeOrigin::Push).await;
    }

    async fn apply<F>(&self, mutate: F) -> SyncResult<MutationOutcome>
    where
        F: Fn(&mut WorkoutAssignment) -> SyncResult<()> + Send + Sync,
    {
        let _guard = self.write_lock.lock().await;
        let (base_doc, sync_state, remote_version, pending) = {
            let state = self.state.read().await;
            let Some(doc) = state.assignment.clone() else {
                return Err(SyncError::not_found("workout assignment"));
            };
            (doc, state.sync_state, state.remote_version, state.pending)
        };

        let mut next = base_doc;
        mutate(&mut next)?;

        if pending || sync_state == SyncState::LocalOnly {
            return Ok(self.stage_pending(next, remote_version).await);
        }

        match self
            .remote
            .write_if_version_matches(next.id, &next, remote_version)
            .await
        {
            WriteOutcome::Committed { version } => {
                self.commit_local(next, version).await;
                Ok(MutationOutcome::Committed { version })
            }
            WriteOutcome::Unreachable(reason) => {
                warn!(client_id = %self.client_id, %reason, "Remote store unreachable, keeping edit locally");
                Ok(self.stage_pending(next, remote_version).await)
            }
            WriteOutcome::NotFound => Err(SyncError::not_found(format!("assignment {}", next.id))),
            WriteOutcome::Conflict {
                current_version,
                current,
            } => {
                self.retry_after_conflict(&mutate, remote_version, current_version, *current)
                    .await
            }
        }
    }

    async fn retry_after_conflict<F>(
        &self,
        mutate: &F,
        expected_version: u64,
        current_version: u64,
        current: WorkoutAssignment,
    ) -> SyncResult<MutationOutcome>
    where
        F: Fn(&mut WorkoutAssignment) -> SyncResult<()> + Send + Sync,
    {
        warn!(
            client_id = %self.client_id,
            expected_version,
            current_version,
            "Write conflicted, re-applying edit on the newer remote version"
        );
        self.set_state(SyncState::Conflict).await;
        self.emit(SyncEvent::ConflictDetected {
            expected_version,
            current_version,
        });
        self.store_remote(current.clone(), ChangeOrigin::Remote).await;

        let mut retry = current;
        if let Err(e) = mutate(&mut retry) {
            self.set_state(SyncState::Synced).await;
            return Err(e);
        }

        match self
            .remote
            .write_if_version_matches(retry.id, &retry, current_version)
            .await
        {
            WriteOutcome::Committed { version } => {
                self.commit_local(retry, version).await;
                Ok(MutationOutcome::Committed { version })
            }
            WriteOutcome::Unreachable(reason) => {
                warn!(client_id = %self.client_id, %reason, "Remote store unreachable on retry, keeping edit locally");
                Ok(self.stage_pending(retry, current_version).await)
            }
            WriteOutcome::NotFound => Err(SyncError::not_found(format!("assignment {}", retry.id))),
            WriteOutcome::Conflict {
                current_version: latest_version,
                current: latest,
            } => {
                warn!(
                    client_id = %self.client_id,
                    expected_version = current_version,
                    current_version = latest_version,
                    "Write conflicted again, surfacing to caller"
                );
                self.emit(SyncEvent::ConflictDetected {
                    expected_version: current_version,
                    current_version: latest_version,
                });
                self.store_remote((*latest).clone(), ChangeOrigin::Remote).await;
                Err(SyncError::Conflict {
                    expected_version: current_version,
                    current_version: latest_version,
                    current: latest,
                })
            }
        }
    }
}

/// Synchronization controller for one client's active assignment
pub struct SyncOrchestrator<R: RemoteStore, C: CacheProvider> {
    core: Arc<SyncCore<R, C>>,
    watcher: StdMutex<Option<Watcher>>,
    disposed: AtomicBool,
}

impl<R: RemoteStore, C: CacheProvider> SyncOrchestrator<R, C> {
    /// Create an orchestrator for `client_id`, writing as `actor`
    #[must_use]
    pub fn new(client_id: Uuid, actor: Actor, remote: Arc<R>, cache: C, config: SyncConfig) -> Self {
        let performance = Arc::new(PerformanceAggregator::new(cache.clone()));
        Self::with_performance(client_id, actor, remote, cache, performance, config)
    }

    /// Create an orchestrator sharing an existing performance aggregator
    #[must_use]
    pub fn with_performance(
        client_id: Uuid,
        actor: Actor,
        remote: Arc<R>,
        cache: C,
        performance: Arc<PerformanceAggregator<C>>,
        config: SyncConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_buffer.max(1));
        let core = SyncCore {
            client_id,
            remote: RemoteSyncClient::new(remote, actor, config.remote_timeout),
            store: VersionedDocumentStore::new(cache),
            performance,
            config,
            state: RwLock::new(SessionState {
                sync_state: SyncState::Uninitialized,
                assignment: None,
                remote_version: 0,
                pending: false,
            }),
            write_lock: Mutex::new(()),
            events,
        };
        Self {
            core: Arc::new(core),
            watcher: StdMutex::new(None),
            disposed: AtomicBool::new(false),
        }
    }

    /// Client this orchestrator serves
    #[must_use]
    pub fn client_id(&self) -> Uuid {
        self.core.client_id
    }

    /// Actor writes are attributed to
    #[must_use]
    pub fn actor(&self) -> Actor {
        self.core.remote.actor()
    }

    /// Performance aggregator backing the performance operations
    #[must_use]
    pub fn performance(&self) -> &Arc<PerformanceAggregator<C>> {
        &self.core.performance
    }

    /// Receive sync events
    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<SyncEvent> {
        self.core.events.subscribe()
    }

    /// Resolve the active assignment: remote, then cache, then `fallback`
    ///
    /// Starts the background watcher on first call when enabled.
    #[instrument(skip_all, fields(client_id = %self.core.client_id))]
    pub async fn load_assignment(&self, fallback: Option<WorkoutAssignment>) -> LoadedAssignment {
        let loaded = self.core.load(fallback).await;
        self.start_watcher();
        loaded
    }

    fn start_watcher(&self) {
        if !self.core.config.enable_background_sync || self.disposed.load(Ordering::Acquire) {
            return;
        }
        let Ok(mut slot) = self.watcher.lock() else {
            return;
        };
        if slot.is_none() {
            *slot = Some(Watcher::spawn(
                Arc::downgrade(&self.core),
                self.core.config.poll_interval,
            ));
        }
    }

    /// Apply an arbitrary edit through the versioned write path
    ///
    /// On a conflict `mutate` is re-applied once to the newer remote document
    /// and the write retried.
    ///
    /// # Errors
    ///
    /// Returns whatever `mutate` rejects with, `SyncError::NotFound` when no
    /// assignment is loaded and `SyncError::Conflict` if the retry conflicts too
    #[instrument(skip_all, fields(client_id = %self.core.client_id))]
    pub async fn apply_mutation<F>(&self, mutate: F) -> SyncResult<MutationOutcome>
    where
        F: Fn(&mut WorkoutAssignment) -> SyncResult<()> + Send + Sync,
    {
        self.core.apply(mutate).await
    }

    /// Change reps or weight of one planned set
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` before any write for a malformed edit,
    /// otherwise as [`Self::apply_mutation`]
    #[instrument(skip_all, fields(client_id = %self.core.client_id, exercise_id = %edit.exercise_id))]
    pub async fn submit_set_edit(&self, edit: SetEdit) -> SyncResult<MutationOutcome> {
        edit.validate_value()?;
        self.core.apply(move |doc| edit.apply(doc)).await
    }

    /// Lock or unlock a program week; only the coach may do this
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` for a client actor or an unknown week
    pub async fn set_week_unlocked(&self, week_number: u32, unlocked: bool) -> SyncResult<MutationOutcome> {
        if self.actor() != Actor::Coach {
            return Err(SyncError::validation(
                "weeks",
                "only the coach can change week unlocks",
            ));
        }
        self.core
            .apply(move |doc| mutation::set_week_unlocked(doc, week_number, unlocked))
            .await
    }

    /// Move the advisory week/day cursor
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` for a locked week or a day outside the program
    pub async fn set_cursor(&self, week: u32, day: u32) -> SyncResult<MutationOutcome> {
        self.core
            .apply(move |doc| mutation::set_cursor(doc, week, day))
            .await
    }

    /// Try to push a pending local edit now
    #[instrument(skip_all, fields(client_id = %self.core.client_id))]
    pub async fn flush_pending(&self) -> SyncState {
        let _guard = self.core.write_lock.lock().await;
        if let Some((pending, base)) = self.core.pending_candidate().await {
            self.core.flush(pending, base, None).await;
        }
        self.core.sync_state().await
    }

    /// Run one poll tick by hand
    pub async fn poll_once(&self) -> SyncState {
        self.core.poll_once().await
    }

    /// Feed a pushed document into the orchestrator
    pub async fn handle_remote_change(&self, document: WorkoutAssignment) {
        self.core.handle_remote_change(document).await;
    }

    /// Current sync state
    pub async fn sync_state(&self) -> SyncState {
        self.core.sync_state().await
    }

    /// Current working copy
    pub async fn assignment(&self) -> Option<WorkoutAssignment> {
        self.core.state.read().await.assignment.clone()
    }

    /// Reachable weeks of the working copy
    pub async fn unlocked_weeks(&self) -> BTreeSet<u32> {
        self.core.snapshot().await.unlocked_weeks
    }

    /// Whether `week` is reachable
    pub async fn is_week_reachable(&self, week: u32) -> bool {
        progression::is_week_reachable(&self.unlocked_weeks().await, week)
    }

    /// Whether a local edit still waits for the remote store
    pub async fn has_pending_write(&self) -> bool {
        self.core.state.read().await.pending
    }

    async fn require_assignment_id(&self) -> SyncResult<Uuid> {
        self.core
            .assignment_id()
            .await
            .ok_or_else(|| SyncError::not_found("workout assignment"))
    }

    /// Record as-performed sets for one exercise
    ///
    /// Works in every sync state; performance data never depends on the
    /// assignment write succeeding.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::NotFound` when no assignment is loaded, or a
    /// validation error from the aggregator
    #[instrument(skip_all, fields(client_id = %self.core.client_id, exercise_id = %record.exercise_id))]
    pub async fn record_exercise(&self, record: ExerciseRecord) -> SyncResult<ExercisePerformance> {
        let assignment_id = self.require_assignment_id().await?;
        let week_number = record.week_number;
        let performance = self
            .core
            .performance
            .record_exercise_performance(self.core.client_id, assignment_id, record)
            .await?;
        self.core.emit(SyncEvent::PerformanceRecorded {
            week_number,
            exercise_id: performance.exercise_id.clone(),
            total_volume: performance.total_volume,
        });
        Ok(performance)
    }

    /// Mark a week completed; `false` if nothing was recorded for it or it already was
    ///
    /// # Errors
    ///
    /// Returns `SyncError::NotFound` when no assignment is loaded
    pub async fn complete_week(&self, week_number: u32) -> SyncResult<bool> {
        let assignment_id = self.require_assignment_id().await?;
        Ok(self
            .core
            .performance
            .mark_week_completed(self.core.client_id, assignment_id, week_number)
            .await)
    }

    /// Total volume for a week
    pub async fn weekly_volume(&self, week_number: u32) -> f64 {
        match self.core.assignment_id().await {
            Some(id) => {
                self.core
                    .performance
                    .weekly_volume(self.core.client_id, id, week_number)
                    .await
            }
            None => 0.0,
        }
    }

    /// Volume of one muscle group in a week
    pub async fn muscle_group_volume(&self, week_number: u32, muscle_group: &str) -> f64 {
        match self.core.assignment_id().await {
            Some(id) => {
                self.core
                    .performance
                    .muscle_group_volume(self.core.client_id, id, week_number, muscle_group)
                    .await
            }
            None => 0.0,
        }
    }

    /// Whether a week was completed
    pub async fn is_week_completed(&self, week_number: u32) -> bool {
        match self.core.assignment_id().await {
            Some(id) => {
                self.core
                    .performance
                    .is_week_completed(self.core.client_id, id, week_number)
                    .await
            }
            None => false,
        }
    }

    /// Full aggregate for a week
    pub async fn weekly_performance(&self, week_number: u32) -> Option<WeeklyPerformance> {
        let id = self.core.assignment_id().await?;
        self.core
            .performance
            .weekly_performance(self.core.client_id, id, week_number)
            .await
    }

    /// Whether `dispose` has run
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Stop the background watcher; safe to call any number of times
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Ok(mut slot) = self.watcher.lock() {
            if let Some(watcher) = slot.take() {
                watcher.stop();
            }
        }
        debug!(client_id = %self.core.client_id, "Sync orchestrator disposed");
    }
}

impl<R: RemoteStore, C: CacheProvider> Drop for SyncOrchestrator<R, C> {
    fn drop(&mut self) {
        self.dispose();
    }
}
