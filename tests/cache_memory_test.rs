// ABOUTME: Tests for the in-memory document cache and the cache factory
// ABOUTME: Tests set/get, invalidation, LRU capacity limits and backend selection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use pierre_coach_sync::cache::factory::Cache;
use pierre_coach_sync::cache::memory::InMemoryCache;
use pierre_coach_sync::cache::{CacheConfig, CacheKey, CacheProvider};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct TestData {
    value: String,
    count: u32,
}

fn data(value: &str, count: u32) -> TestData {
    TestData {
        value: value.to_owned(),
        count,
    }
}

#[tokio::test]
async fn test_cache_set_and_get() -> Result<()> {
    let cache = InMemoryCache::with_capacity(10);
    let key = CacheKey::active_assignment(Uuid::new_v4());

    cache.set(&key, &data("test", 42)).await?;

    let retrieved: Option<TestData> = cache.get(&key).await?;
    assert_eq!(retrieved, Some(data("test", 42)));
    assert!(cache.exists(&key).await?);
    Ok(())
}

#[tokio::test]
async fn test_cache_overwrite_and_invalidate() -> Result<()> {
    let cache = InMemoryCache::with_capacity(10);
    let key = CacheKey::performance(Uuid::new_v4(), Uuid::new_v4());

    cache.set(&key, &data("first", 1)).await?;
    cache.set(&key, &data("second", 2)).await?;
    assert_eq!(cache.get::<TestData>(&key).await?, Some(data("second", 2)));
    assert_eq!(cache.len().await, 1);

    cache.invalidate(&key).await?;
    assert!(cache.get::<TestData>(&key).await?.is_none());
    assert!(!cache.exists(&key).await?);
    Ok(())
}

#[tokio::test]
async fn test_keys_are_scoped_by_client_and_resource() -> Result<()> {
    let cache = InMemoryCache::with_capacity(10);
    let client = Uuid::new_v4();
    let assignment_key = CacheKey::active_assignment(client);
    let performance_key = CacheKey::performance(client, Uuid::new_v4());

    cache.set(&assignment_key, &data("assignment", 1)).await?;
    assert!(cache.get::<TestData>(&performance_key).await?.is_none());
    assert!(cache
        .get::<TestData>(&CacheKey::active_assignment(Uuid::new_v4()))
        .await?
        .is_none());
    Ok(())
}

#[tokio::test]
async fn test_capacity_evicts_least_recently_used() -> Result<()> {
    let cache = InMemoryCache::with_capacity(2);
    let keys: Vec<CacheKey> = (0..3)
        .map(|_| CacheKey::active_assignment(Uuid::new_v4()))
        .collect();

    cache.set(&keys[0], &data("a", 0)).await?;
    cache.set(&keys[1], &data("b", 1)).await?;
    // touch the oldest so the second becomes the eviction candidate
    let _: Option<TestData> = cache.get(&keys[0]).await?;
    cache.set(&keys[2], &data("c", 2)).await?;

    assert_eq!(cache.len().await, 2);
    assert!(cache.exists(&keys[0]).await?);
    assert!(!cache.exists(&keys[1]).await?);
    assert!(cache.exists(&keys[2]).await?);
    Ok(())
}

#[tokio::test]
async fn test_clear_all() -> Result<()> {
    let cache = InMemoryCache::with_capacity(10);
    for i in 0..5 {
        cache
            .set(&CacheKey::active_assignment(Uuid::new_v4()), &data("x", i))
            .await?;
    }
    assert!(!cache.is_empty().await);

    cache.clear_all().await?;
    assert!(cache.is_empty().await);
    cache.health_check().await?;
    Ok(())
}

#[tokio::test]
async fn test_factory_defaults_to_memory_backend() -> Result<()> {
    let cache = Cache::new(CacheConfig {
        database_url: None,
        max_entries: 16,
    })
    .await?;
    assert_eq!(cache.backend_name(), "memory");

    let key = CacheKey::active_assignment(Uuid::new_v4());
    cache.set(&key, &data("via factory", 7)).await?;
    assert_eq!(cache.get::<TestData>(&key).await?, Some(data("via factory", 7)));
    Ok(())
}
