// ABOUTME: SQLite-backed durable document cache that survives process restarts
// ABOUTME: Single-table key-value store with upsert semantics
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{CacheConfig, CacheKey, CacheProvider};
use crate::errors::{AppError, AppResult};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tracing::debug;

/// Durable cache on a SQLite file
///
/// The pool is limited to a single connection: the cache has one logical
/// writer per key and `sqlite::memory:` databases are per-connection.
#[derive(Clone)]
pub struct SqliteCache {
    pool: SqlitePool,
}

impl SqliteCache {
    /// Open (creating if needed) the cache database at `database_url`
    ///
    /// # Errors
    ///
    /// Returns a storage error if the database cannot be opened or migrated
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.contains(":memory:") || database_url.contains('?')
        {
            database_url.to_owned()
        } else {
            format!("{database_url}?mode=rwc")
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&connection_options)
            .await
            .map_err(|e| {
                AppError::storage_unavailable(format!("Failed to open cache database: {e}"))
            })?;

        let cache = Self { pool };
        cache.migrate().await?;
        debug!(url = %database_url, "SQLite document cache ready");
        Ok(cache)
    }

    async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS document_cache (
                cache_key TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::storage_unavailable(format!("Failed to migrate cache: {e}")))?;
        Ok(())
    }

    /// Close the pool (subsequent calls fail with a storage error)
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait::async_trait]
impl CacheProvider for SqliteCache {
    async fn new(config: CacheConfig) -> AppResult<Self> {
        let url = config
            .database_url
            .ok_or_else(|| AppError::config("SQLite cache requires a database URL"))?;
        Self::connect(&url).await
    }

    async fn set<T: Serialize + Send + Sync>(&self, key: &CacheKey, value: &T) -> AppResult<()> {
        let payload = serde_json::to_string(value)?;
        sqlx::query(
            r"
            INSERT INTO document_cache (cache_key, payload, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT(cache_key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key.to_string())
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::storage_unavailable(format!("Failed to write cache entry: {e}")))?;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        let row = sqlx::query("SELECT payload FROM document_cache WHERE cache_key = $1")
            .bind(key.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::storage_unavailable(format!("Failed to read cache entry: {e}"))
            })?;

        row.map(|r| {
            let payload: String = r.get("payload");
            serde_json::from_str(&payload).map_err(AppError::from)
        })
        .transpose()
    }

    async fn invalidate(&self, key: &CacheKey) -> AppResult<()> {
        sqlx::query("DELETE FROM document_cache WHERE cache_key = $1")
            .bind(key.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::storage_unavailable(format!("Failed to delete cache entry: {e}"))
            })?;
        Ok(())
    }

    async fn exists(&self, key: &CacheKey) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 AS present FROM document_cache WHERE cache_key = $1")
            .bind(key.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::storage_unavailable(format!("Failed to check cache: {e}")))?;
        Ok(row.is_some())
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::storage_unavailable(format!("Cache health check failed: {e}")))?;
        Ok(())
    }

    async fn clear_all(&self) -> AppResult<()> {
        sqlx::query("DELETE FROM document_cache")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::storage_unavailable(format!("Failed to clear cache: {e}")))?;
        Ok(())
    }
}
