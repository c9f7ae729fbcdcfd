// ABOUTME: Assignment synchronization engine between coach, client, remote store and local cache
// ABOUTME: Versioned local store, remote client, echo suppression, validated mutations, orchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Assignment Synchronization
//!
//! Conflict resolution is last-writer-wins over the whole assignment
//! document, guarded by a version counter the remote store increments on
//! every accepted write. A writer that loses the race re-applies its edit on
//! top of the winner's document instead of overwriting it.

/// Self-echo detection
pub mod echo;
/// Validated document edits
pub mod mutation;
/// Per-client controller
pub mod orchestrator;
/// Remote store client and backends
pub mod remote;
/// Local versioned document cache
pub mod versioned_store;

mod watcher;

pub use echo::EchoGuard;
pub use mutation::{SetEdit, SetField};
pub use orchestrator::{
    ChangeOrigin, LoadedAssignment, MutationOutcome, SyncEvent, SyncOrchestrator, SyncState,
};
pub use remote::{
    FetchOutcome, HttpRemoteStore, InMemoryRemoteStore, RemoteStore, RemoteSubscription,
    RemoteSyncClient, RemoteWrite, WriteOutcome,
};
pub use versioned_store::{VersionedDocument, VersionedDocumentStore};
