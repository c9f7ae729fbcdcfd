// ABOUTME: Background task feeding push deliveries and fallback poll ticks into an orchestrator
// ABOUTME: Holds only a weak reference and stops on shutdown signal or when the orchestrator is gone
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::orchestrator::SyncCore;
use super::remote::{RemoteStore, RemoteSubscription};
use crate::cache::CacheProvider;
use crate::models::WorkoutAssignment;
use std::sync::Weak;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

/// Handle to a running watcher task
pub(super) struct Watcher {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl Watcher {
    /// Spawn the watcher onto the current tokio runtime
    pub(super) fn spawn<R: RemoteStore, C: CacheProvider>(
        core: Weak<SyncCore<R, C>>,
        poll_interval: Duration,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let task = tokio::spawn(run(core, poll_interval, shutdown_rx));
        Self { shutdown_tx, task }
    }

    /// Signal shutdown and make sure the task cannot run another tick
    pub(super) fn stop(self) {
        if let Err(e) = self.shutdown_tx.try_send(()) {
            debug!(error = ?e, "Watcher shutdown signal send failed (task likely finished)");
        }
        // the task may be parked inside a remote call
        self.task.abort();
    }
}

async fn next_push(subscription: &mut Option<RemoteSubscription>) -> Option<WorkoutAssignment> {
    match subscription {
        Some(subscription) => subscription.recv().await,
        None => std::future::pending().await,
    }
}

async fn run<R: RemoteStore, C: CacheProvider>(
    core: Weak<SyncCore<R, C>>,
    poll_interval: Duration,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick completes immediately
    interval.tick().await;

    let mut subscription: Option<RemoteSubscription> = None;
    // no subscribe attempt before this instant after a failed or closed channel
    let mut resubscribe_at: Option<Instant> = None;

    loop {
        {
            let Some(core) = core.upgrade() else { break };
            let current = core.current_assignment_id().await;
            let subscribed = subscription.as_ref().map(RemoteSubscription::assignment_id);
            let backing_off = resubscribe_at.is_some_and(|at| Instant::now() < at);
            if current != subscribed && !backing_off {
                subscription = match current {
                    Some(_) => core.open_subscription().await,
                    None => None,
                };
                if subscription.is_some() {
                    if resubscribe_at.take().is_some() {
                        // changes made while the channel was down were never pushed
                        let state = core.poll_once().await;
                        debug!(?state, "Push channel reopened, caught up by polling");
                    }
                } else if current.is_some() {
                    resubscribe_at = Some(Instant::now() + poll_interval);
                }
            }
        }

        let polling = subscription.is_none();
        let mut push_closed = false;

        tokio::select! {
            _ = shutdown_rx.recv() => {
                debug!("Sync watcher received shutdown signal");
                break;
            }
            change = next_push(&mut subscription) => {
                let Some(core) = core.upgrade() else { break };
                match change {
                    Some(document) => core.handle_remote_change(document).await,
                    None => {
                        debug!("Push channel closed, falling back to polling");
                        push_closed = true;
                        let state = core.poll_once().await;
                        debug!(?state, "Poll after push channel closed");
                    }
                }
            }
            _ = interval.tick() => {
                let Some(core) = core.upgrade() else { break };
                if polling || core.needs_poll().await {
                    let state = core.poll_once().await;
                    debug!(?state, "Poll tick");
                }
            }
        }

        if push_closed {
            subscription = None;
            resubscribe_at = Some(Instant::now() + poll_interval);
            interval.reset();
        }
    }

    debug!("Sync watcher stopped");
}
