// ABOUTME: Local durable cache abstraction for assignment documents and performance records
// ABOUTME: Pluggable backend support (in-memory LRU, SQLite) behind one async trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Cache factory for creating cache providers
pub mod factory;
/// In-memory cache implementation
pub mod memory;
/// SQLite cache implementation
pub mod sqlite;

pub use crate::config::CacheConfig;

use crate::constants::cache::CACHE_KEY_PREFIX;
use crate::errors::AppResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Cache provider trait for pluggable backend implementations
///
/// The cache is a plain key-value store: `set` overwrites unconditionally and
/// never arbitrates between versions. Concurrent writers to the same key must
/// be serialized by the caller.
///
/// # Examples
///
/// ```rust,no_run
/// use pierre_coach_sync::cache::{CacheConfig, CacheKey, CacheProvider};
/// use pierre_coach_sync::cache::memory::InMemoryCache;
/// use uuid::Uuid;
/// # async fn example() -> Result<(), pierre_coach_sync::errors::AppError> {
///
/// let cache = InMemoryCache::new(CacheConfig::default()).await?;
/// let key = CacheKey::active_assignment(Uuid::new_v4());
///
/// cache.set(&key, &"cached_value").await?;
/// let cached: Option<String> = cache.get(&key).await?;
/// assert_eq!(cached.as_deref(), Some("cached_value"));
///
/// cache.invalidate(&key).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait CacheProvider: Send + Sync + Clone + 'static {
    /// Create new cache instance with configuration
    ///
    /// # Errors
    ///
    /// Returns an error if cache initialization fails
    async fn new(config: CacheConfig) -> AppResult<Self>
    where
        Self: Sized;

    /// Store value under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or storage fails
    async fn set<T: Serialize + Send + Sync>(&self, key: &CacheKey, value: &T) -> AppResult<()>;

    /// Retrieve value from cache
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the stored value cannot be decoded
    async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> AppResult<Option<T>>;

    /// Remove single cache entry
    ///
    /// # Errors
    ///
    /// Returns an error if invalidation fails
    async fn invalidate(&self, key: &CacheKey) -> AppResult<()>;

    /// Check if key exists in cache
    ///
    /// # Errors
    ///
    /// Returns an error if existence check fails
    async fn exists(&self, key: &CacheKey) -> AppResult<bool>;

    /// Verify cache backend is healthy
    ///
    /// # Errors
    ///
    /// Returns an error if health check fails
    async fn health_check(&self) -> AppResult<()>;

    /// Clear all cache entries (for testing/admin)
    ///
    /// # Errors
    ///
    /// Returns an error if clear operation fails
    async fn clear_all(&self) -> AppResult<()>;
}

/// Structured cache key, one namespace per client
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Client the entry belongs to
    pub client_id: Uuid,
    /// Specific resource being cached
    pub resource: CacheResource,
}

impl CacheKey {
    /// Create new cache key
    #[must_use]
    pub const fn new(client_id: Uuid, resource: CacheResource) -> Self {
        Self {
            client_id,
            resource,
        }
    }

    /// Key of the pointer to the client's active assignment id
    #[must_use]
    pub const fn active_assignment(client_id: Uuid) -> Self {
        Self::new(client_id, CacheResource::ActiveAssignment)
    }

    /// Key of the versioned document for (client, assignment)
    #[must_use]
    pub const fn assignment(client_id: Uuid, assignment_id: Uuid) -> Self {
        Self::new(client_id, CacheResource::Assignment { assignment_id })
    }

    /// Key of the performance root for (client, assignment)
    #[must_use]
    pub const fn performance(client_id: Uuid, assignment_id: Uuid) -> Self {
        Self::new(client_id, CacheResource::Performance { assignment_id })
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{CACHE_KEY_PREFIX}client:{}:{}",
            self.client_id, self.resource
        )
    }
}

/// Cache resource types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheResource {
    /// Id of the client's active assignment
    ActiveAssignment,
    /// Latest known assignment document with its version metadata
    Assignment {
        /// Assignment the document belongs to
        assignment_id: Uuid,
    },
    /// Performance records for one assignment
    Performance {
        /// Assignment the records belong to
        assignment_id: Uuid,
    },
}

impl fmt::Display for CacheResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActiveAssignment => write!(f, "assignment"),
            Self::Assignment { assignment_id } => write!(f, "assignment:{assignment_id}"),
            Self::Performance { assignment_id } => write!(f, "performance:{assignment_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display() {
        let client = Uuid::from_u128(7);
        let assignment = Uuid::from_u128(9);
        assert_eq!(
            CacheKey::active_assignment(client).to_string(),
            format!("pierre:sync:client:{client}:assignment")
        );
        assert_eq!(
            CacheKey::assignment(client, assignment).to_string(),
            format!("pierre:sync:client:{client}:assignment:{assignment}")
        );
        assert_eq!(
            CacheKey::performance(client, assignment).to_string(),
            format!("pierre:sync:client:{client}:performance:{assignment}")
        );
    }
}
