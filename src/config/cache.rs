// ABOUTME: Local document cache configuration
// ABOUTME: Selects the SQLite durable backend or the bounded in-memory backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::env_parse_or;
use crate::constants::{cache, env_config};
use std::env;

/// Cache configuration for the local document store
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// `sqlite:` URL of the durable cache; `None` selects the in-memory cache
    pub database_url: Option<String>,
    /// Maximum number of entries (for in-memory cache)
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_entries: cache::DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

impl CacheConfig {
    /// Load cache configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            database_url: env::var(env_config::CACHE_DATABASE_URL)
                .ok()
                .filter(|url| !url.trim().is_empty()),
            max_entries: env_parse_or(
                env_config::CACHE_MAX_ENTRIES,
                cache::DEFAULT_CACHE_MAX_ENTRIES,
            ),
        }
    }

    /// Durable cache stored in a file under `dir`
    #[must_use]
    pub fn sqlite_in(dir: &std::path::Path) -> Self {
        Self {
            database_url: Some(format!("sqlite:{}", dir.join("coach_sync.db").display())),
            ..Self::default()
        }
    }
}
