// ABOUTME: Orchestrator timing configuration for polling, remote timeouts and events
// ABOUTME: Tests disable the background task and drive poll ticks by hand
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{env_flag_or, env_parse_or};
use crate::constants::{env_config, sync};
use std::time::Duration;

/// Orchestrator timing configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Interval between fallback polls
    pub poll_interval: Duration,
    /// Bound after which a remote call counts as unreachable
    pub remote_timeout: Duration,
    /// Capacity of the sync event broadcast channel
    pub event_buffer: usize,
    /// Spawn the push/poll watcher on first load (disable in tests)
    pub enable_background_sync: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(sync::DEFAULT_POLL_INTERVAL_SECS),
            remote_timeout: Duration::from_secs(sync::DEFAULT_REMOTE_TIMEOUT_SECS),
            event_buffer: sync::DEFAULT_EVENT_BUFFER,
            enable_background_sync: true,
        }
    }
}

impl SyncConfig {
    /// Load sync configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            poll_interval: Duration::from_secs(env_parse_or(
                env_config::POLL_INTERVAL_SECS,
                sync::DEFAULT_POLL_INTERVAL_SECS,
            )),
            remote_timeout: Duration::from_secs(env_parse_or(
                env_config::REMOTE_TIMEOUT_SECS,
                sync::DEFAULT_REMOTE_TIMEOUT_SECS,
            )),
            event_buffer: env_parse_or(env_config::EVENT_BUFFER, sync::DEFAULT_EVENT_BUFFER)
                .max(1),
            enable_background_sync: env_flag_or(env_config::BACKGROUND_SYNC, true),
        }
    }

    /// Configuration for tests: no background task, short remote timeout
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            remote_timeout: Duration::from_millis(200),
            event_buffer: sync::DEFAULT_EVENT_BUFFER,
            enable_background_sync: false,
        }
    }
}
