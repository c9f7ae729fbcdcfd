// ABOUTME: Tests for the SQLite document cache
// ABOUTME: Tests upserts, restart durability and pending edits surviving a process restart
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use anyhow::Result;
use common::{init_test_logging, sample_assignment, weight_edit};
use pierre_coach_sync::cache::factory::Cache;
use pierre_coach_sync::cache::sqlite::SqliteCache;
use pierre_coach_sync::cache::{CacheConfig, CacheKey, CacheProvider};
use pierre_coach_sync::config::SyncConfig;
use pierre_coach_sync::models::Actor;
use pierre_coach_sync::sync::{
    InMemoryRemoteStore, MutationOutcome, SyncEvent, SyncOrchestrator, SyncState,
    VersionedDocumentStore,
};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

async fn open(dir: &TempDir) -> Result<Cache> {
    init_test_logging();
    Ok(Cache::new(CacheConfig::sqlite_in(dir.path())).await?)
}

#[tokio::test]
async fn test_factory_selects_sqlite_for_database_url() -> Result<()> {
    let dir = TempDir::new()?;
    let cache = open(&dir).await?;
    assert_eq!(cache.backend_name(), "sqlite");
    cache.health_check().await?;
    Ok(())
}

#[tokio::test]
async fn test_upsert_and_invalidate() -> Result<()> {
    let cache = SqliteCache::connect("sqlite::memory:").await?;
    let key = CacheKey::active_assignment(Uuid::new_v4());

    cache.set(&key, &vec![1_u32, 2, 3]).await?;
    cache.set(&key, &vec![4_u32]).await?;
    assert_eq!(cache.get::<Vec<u32>>(&key).await?, Some(vec![4]));
    assert!(cache.exists(&key).await?);

    cache.invalidate(&key).await?;
    assert!(!cache.exists(&key).await?);

    cache.set(&key, &"again").await?;
    cache.clear_all().await?;
    assert!(cache.get::<String>(&key).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_closed_pool_reports_storage_error() -> Result<()> {
    let cache = SqliteCache::connect("sqlite::memory:").await?;
    cache.close().await;

    let key = CacheKey::active_assignment(Uuid::new_v4());
    assert!(cache.set(&key, &1_u32).await.is_err());
    assert!(cache.health_check().await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_documents_survive_restart() -> Result<()> {
    let dir = TempDir::new()?;
    let client_id = Uuid::new_v4();
    let mut document = sample_assignment(client_id);
    document.stamp(3, Actor::Coach);

    {
        let store = VersionedDocumentStore::new(open(&dir).await?);
        store.put(&document, 3, Actor::Coach).await?;
    }

    let reopened = VersionedDocumentStore::new(open(&dir).await?);
    let cached = reopened.get(client_id).await?.expect("survived restart");
    assert_eq!(cached.version, 3);
    assert_eq!(cached.document, document);
    Ok(())
}

#[tokio::test]
async fn test_pending_edit_is_flushed_after_restart() -> Result<()> {
    let dir = TempDir::new()?;
    let remote = Arc::new(InMemoryRemoteStore::new());
    let assignment = sample_assignment(Uuid::new_v4());
    remote.insert_assignment(assignment.clone()).await;

    {
        let client = SyncOrchestrator::new(
            assignment.client_id,
            Actor::Client,
            Arc::clone(&remote),
            open(&dir).await?,
            SyncConfig::for_tests(),
        );
        client.load_assignment(None).await;
        remote.set_reachable(false);
        let outcome = client.submit_set_edit(weight_edit(&assignment, 0, 82.5)).await?;
        assert_eq!(outcome, MutationOutcome::Pending { local_version: 1 });
        client.dispose();
    }

    // offline restart resumes from the pending copy
    let offline = SyncOrchestrator::new(
        assignment.client_id,
        Actor::Client,
        Arc::clone(&remote),
        open(&dir).await?,
        SyncConfig::for_tests(),
    );
    let loaded = offline.load_assignment(None).await;
    assert_eq!(loaded.sync_state, SyncState::LocalOnly);
    assert!(offline.has_pending_write().await);
    offline.dispose();
    drop(offline);

    remote.set_reachable(true);
    let online = SyncOrchestrator::new(
        assignment.client_id,
        Actor::Client,
        Arc::clone(&remote),
        open(&dir).await?,
        SyncConfig::for_tests(),
    );
    let mut events = online.subscribe_events();
    let loaded = online.load_assignment(None).await;

    assert_eq!(loaded.sync_state, SyncState::Synced);
    assert_eq!(loaded.assignment.as_ref().map(|a| a.version), Some(1));
    let mut flushed = false;
    while let Ok(event) = events.try_recv() {
        flushed |= event == SyncEvent::PendingFlushed { version: 1 };
    }
    assert!(flushed);

    let stored = remote.assignment(assignment.id).await.expect("remote doc");
    assert!((stored.program[0].exercises[0].sets[0].weight - 82.5).abs() < f64::EPSILON);
    Ok(())
}
