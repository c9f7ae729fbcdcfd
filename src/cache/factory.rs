// ABOUTME: Cache factory for configuration-based backend selection
// ABOUTME: Chooses SQLite when a database URL is configured, the in-memory LRU otherwise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::memory::InMemoryCache;
use super::sqlite::SqliteCache;
use super::{CacheConfig, CacheKey, CacheProvider};
use crate::errors::AppResult;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Unified cache interface
#[derive(Clone)]
pub enum Cache {
    /// Volatile LRU cache
    Memory(InMemoryCache),
    /// Durable SQLite cache
    Sqlite(SqliteCache),
}

impl Cache {
    /// Create cache from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if cache initialization fails
    pub async fn from_env() -> AppResult<Self> {
        <Self as CacheProvider>::new(CacheConfig::from_env()).await
    }

    /// Short backend name for logs and CLI output
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Sqlite(_) => "sqlite",
        }
    }
}

#[async_trait::async_trait]
impl CacheProvider for Cache {
    async fn new(config: CacheConfig) -> AppResult<Self> {
        if let Some(url) = config.database_url.as_deref() {
            tracing::info!("Initializing SQLite document cache");
            return Ok(Self::Sqlite(SqliteCache::connect(url).await?));
        }

        tracing::info!(
            "Initializing in-memory document cache (max entries: {}); cached documents will not survive restart",
            config.max_entries
        );
        Ok(Self::Memory(InMemoryCache::with_capacity(config.max_entries)))
    }

    async fn set<T: Serialize + Send + Sync>(&self, key: &CacheKey, value: &T) -> AppResult<()> {
        match self {
            Self::Memory(cache) => cache.set(key, value).await,
            Self::Sqlite(cache) => cache.set(key, value).await,
        }
    }

    async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        match self {
            Self::Memory(cache) => cache.get(key).await,
            Self::Sqlite(cache) => cache.get(key).await,
        }
    }

    async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        match self {
            Self::Memory(cache) => cache.invalidate(key).await,
            Self::Sqlite(cache) => cache.invalidate(key).await,
        }
    }

    async fn exists(&self, key: &CacheKey) -> AppResult<bool> {
        match self {
            Self::Memory(cache) => cache.exists(key).await,
            Self::Sqlite(cache) => cache.exists(key).await,
        }
    }

    async fn health_check(&self) -> AppResult<()> {
        match self {
            Self::Memory(cache) => cache.health_check().await,
            Self::Sqlite(cache) => cache.health_check().await,
        }
    }

    async fn clear_all(&self) -> AppResult<()> {
        match self {
            Self::Memory(cache) => cache.clear_all().await,
            Self::Sqlite(cache) => cache.clear_all().await,
        }
    }
}
