// ABOUTME: Typed wrapper over the local cache holding the latest known assignment and its version
// ABOUTME: Unconditional overwrite; locally-authored documents are tagged pending until flushed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::cache::{CacheKey, CacheProvider};
use crate::errors::{SyncError, SyncResult};
use crate::models::{Actor, WorkoutAssignment};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

/// Cached assignment with version metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionedDocument {
    /// The assignment as last seen or locally edited
    pub document: WorkoutAssignment,
    /// Version of `document`; tentative while `pending`
    pub version: u64,
    /// Actor that produced `version`
    pub last_modified_by: Actor,
    /// Locally authored and not yet accepted by the remote store
    #[serde(default)]
    pub pending: bool,
    /// Last remote version the pending edit was based on
    #[serde(default)]
    pub base_version: u64,
}

/// Local durable store for assignment documents
///
/// Documents are keyed per (client, assignment); a per-client pointer names
/// the active assignment so a document can be found before its id is known.
/// This is not a conflict-resolution authority: `put` always overwrites and
/// concurrent writers for one client must be serialized by the caller.
#[derive(Clone)]
pub struct VersionedDocumentStore<C: CacheProvider> {
    cache: C,
}

impl<C: CacheProvider> VersionedDocumentStore<C> {
    /// Wrap a cache backend
    #[must_use]
    pub const fn new(cache: C) -> Self {
        Self { cache }
    }

    /// Underlying cache, shared with the performance aggregator
    #[must_use]
    pub const fn cache(&self) -> &C {
        &self.cache
    }

    /// Read the cached document for a client
    ///
    /// # Errors
    ///
    /// Returns `SyncError::StorageUnavailable` if the cache cannot be read
    pub async fn get(&self, client_id: Uuid) -> SyncResult<Option<VersionedDocument>> {
        let Some(assignment_id) = self.active_id(client_id).await? else {
            return Ok(None);
        };
        self.cache
            .get(&CacheKey::assignment(client_id, assignment_id))
            .await
            .map_err(|e| SyncError::storage(e.message))
    }

    /// Store a document the remote store has accepted
    ///
    /// # Errors
    ///
    /// Returns `SyncError::StorageUnavailable` if the cache cannot be written
    pub async fn put(
        &self,
        document: &WorkoutAssignment,
        version: u64,
        actor: Actor,
    ) -> SyncResult<()> {
        let entry = VersionedDocument {
            document: document.clone(),
            version,
            last_modified_by: actor,
            pending: false,
            base_version: version,
        };
        self.write(document.client_id, &entry).await
    }

    /// Store a locally-authored document that still has to reach the remote store
    ///
    /// # Errors
    ///
    /// Returns `SyncError::StorageUnavailable` if the cache cannot be written
    pub async fn put_pending(
        &self,
        document: &WorkoutAssignment,
        base_version: u64,
        actor: Actor,
    ) -> SyncResult<()> {
        let entry = VersionedDocument {
            document: document.clone(),
            version: document.version,
            last_modified_by: actor,
            pending: true,
            base_version,
        };
        self.write(document.client_id, &entry).await
    }

    /// Drop the cached document for a client
    ///
    /// # Errors
    ///
    /// Returns `SyncError::StorageUnavailable` if the cache cannot be written
    pub async fn remove(&self, client_id: Uuid) -> SyncResult<()> {
        if let Some(assignment_id) = self.active_id(client_id).await? {
            self.invalidate(&CacheKey::assignment(client_id, assignment_id)).await?;
        }
        self.invalidate(&CacheKey::active_assignment(client_id)).await
    }

    /// Read the cached document, treating storage failure as "nothing cached"
    pub async fn load_or_absent(&self, client_id: Uuid) -> Option<VersionedDocument> {
        match self.get(client_id).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(client_id = %client_id, error = %e, "Local cache unreadable, ignoring it");
                None
            }
        }
    }

    async fn active_id(&self, client_id: Uuid) -> SyncResult<Option<Uuid>> {
        self.cache
            .get(&CacheKey::active_assignment(client_id))
            .await
            .map_err(|e| SyncError::storage(e.message))
    }

    async fn invalidate(&self, key: &CacheKey) -> SyncResult<()> {
        self.cache
            .invalidate(key)
            .await
            .map_err(|e| SyncError::storage(e.message))
    }

    async fn write(&self, client_id: Uuid, entry: &VersionedDocument) -> SyncResult<()> {
        let assignment_id = entry.document.id;
        let previous = self.active_id(client_id).await?;

        self.cache
            .set(&CacheKey::assignment(client_id, assignment_id), entry)
            .await
            .map_err(|e| SyncError::storage(e.message))?;
        if previous != Some(assignment_id) {
            self.cache
                .set(&CacheKey::active_assignment(client_id), &assignment_id)
                .await
                .map_err(|e| SyncError::storage(e.message))?;
            // a replaced assignment's document is never read again
            if let Some(replaced) = previous {
                self.invalidate(&CacheKey::assignment(client_id, replaced)).await?;
            }
        }
        debug!(
            client_id = %client_id,
            assignment_id = %assignment_id,
            version = entry.version,
            pending = entry.pending,
            "Cached assignment document"
        );
        Ok(())
    }
}
