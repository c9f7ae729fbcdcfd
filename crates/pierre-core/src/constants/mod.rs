// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for the coaching sync engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants grouped by domain.

/// Local cache constants (capacity, key prefix)
pub mod cache;
/// Synchronization timing constants
pub mod sync;

/// Service names used in structured logs
pub mod service_names {
    /// Name reported by the sync engine and CLI
    pub const PIERRE_COACH_SYNC: &str = "pierre-coach-sync";
}

/// Environment variable names read by `from_env` constructors
pub mod env_config {
    /// Poll interval override in seconds
    pub const POLL_INTERVAL_SECS: &str = "PIERRE_SYNC_POLL_INTERVAL_SECS";
    /// Remote timeout override in seconds
    pub const REMOTE_TIMEOUT_SECS: &str = "PIERRE_SYNC_REMOTE_TIMEOUT_SECS";
    /// Event channel capacity override
    pub const EVENT_BUFFER: &str = "PIERRE_SYNC_EVENT_BUFFER";
    /// Toggle for the background watcher task
    pub const BACKGROUND_SYNC: &str = "PIERRE_SYNC_BACKGROUND";
    /// SQLite URL for the durable cache
    pub const CACHE_DATABASE_URL: &str = "PIERRE_CACHE_DATABASE_URL";
    /// In-memory cache capacity
    pub const CACHE_MAX_ENTRIES: &str = "PIERRE_CACHE_MAX_ENTRIES";
    /// Base URL of the authoritative remote store
    pub const REMOTE_URL: &str = "PIERRE_REMOTE_URL";
}
