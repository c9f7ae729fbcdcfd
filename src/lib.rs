// ABOUTME: Main library entry point for the Pierre coach/client assignment sync engine
// ABOUTME: Versioned assignment synchronization, week progression and training volume aggregation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Coach Sync
//!
//! Keeps a workout assignment consistent while a coach and a client edit it
//! concurrently, across an authoritative remote store and a local durable
//! cache used when the remote store cannot be reached.
//!
//! ## Components
//!
//! - **Cache**: local key-value store (in-memory LRU or SQLite)
//! - **Sync**: versioned document store, remote client with optimistic
//!   version checks, push/poll watcher and the per-client orchestrator
//! - **Progression**: reachable weeks from coach-controlled unlock flags
//! - **Performance**: as-performed sets rolled up into weekly and
//!   per-muscle-group volume
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pierre_coach_sync::cache::memory::InMemoryCache;
//! use pierre_coach_sync::config::SyncConfig;
//! use pierre_coach_sync::models::Actor;
//! use pierre_coach_sync::sync::{InMemoryRemoteStore, SyncOrchestrator};
//! use uuid::Uuid;
//!
//! # async fn example() {
//! let remote = Arc::new(InMemoryRemoteStore::new());
//! let orchestrator = SyncOrchestrator::new(
//!     Uuid::new_v4(),
//!     Actor::Client,
//!     remote,
//!     InMemoryCache::with_capacity(100),
//!     SyncConfig::default(),
//! );
//! let loaded = orchestrator.load_assignment(None).await;
//! println!("state: {:?}, weeks: {:?}", loaded.sync_state, loaded.unlocked_weeks);
//! orchestrator.dispose();
//! # }
//! ```

/// Local durable cache backends
pub mod cache;

/// Environment-based configuration
pub mod config;

/// Application constants
pub mod constants;

/// Error types
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Assignment and performance data model
pub mod models;

/// Training volume aggregation
pub mod performance;

/// Week unlock resolution
pub mod progression;

/// Assignment synchronization engine
pub mod sync;

/// HTTP client helpers
pub mod utils;
