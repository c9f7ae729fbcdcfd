// ABOUTME: Configuration management for the sync engine, local cache and remote store
// ABOUTME: Environment-only configuration with defaults from pierre-core constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! Every setting is read from the environment through a `from_env()`
//! constructor; there are no configuration files.
//!
//! - **Sync**: poll interval, remote timeout, event fan-out, background task toggle
//! - **Cache**: local durable cache backend selection and capacity
//! - **Remote**: base URL and HTTP timeouts of the authoritative store

/// Local cache backend configuration
pub mod cache;
/// Remote store connection configuration
pub mod remote;
/// Orchestrator timing configuration
pub mod sync;

pub use cache::CacheConfig;
pub use remote::RemoteConfig;
pub use sync::SyncConfig;

use std::env;
use std::str::FromStr;
use tracing::info;

/// Aggregate configuration for one sync deployment
#[derive(Debug, Clone, Default)]
pub struct CoachSyncConfig {
    /// Orchestrator timing
    pub sync: SyncConfig,
    /// Local cache
    pub cache: CacheConfig,
    /// Remote store
    pub remote: RemoteConfig,
}

impl CoachSyncConfig {
    /// Load all sections from the environment
    #[must_use]
    pub fn from_env() -> Self {
        let config = Self {
            sync: SyncConfig::from_env(),
            cache: CacheConfig::from_env(),
            remote: RemoteConfig::from_env(),
        };
        info!(
            poll_interval_secs = config.sync.poll_interval.as_secs(),
            remote_timeout_secs = config.sync.remote_timeout.as_secs(),
            durable_cache = config.cache.database_url.is_some(),
            remote_configured = config.remote.base_url.is_some(),
            "Coach sync configuration loaded"
        );
        config
    }
}

/// Parse an environment variable, falling back to `default` when unset or malformed
pub(crate) fn env_parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Read a boolean flag (`false`/`0` disable, anything else enables)
pub(crate) fn env_flag_or(key: &str, default: bool) -> bool {
    env::var(key).map_or(default, |v| v != "false" && v != "0")
}
