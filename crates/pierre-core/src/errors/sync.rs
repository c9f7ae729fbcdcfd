// ABOUTME: Typed error taxonomy for assignment synchronization
// ABOUTME: Storage, reachability, absence, version conflict and validation failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Sync Error Types
//!
//! Transient kinds (`Unreachable`, `StorageUnavailable`) are absorbed by the
//! orchestrator and only show up in logs. `Conflict` and `Validation` reach the
//! caller and carry enough context to act on them.

use super::{AppError, ErrorCode};
use crate::models::WorkoutAssignment;
use thiserror::Error;

/// Errors raised by the synchronization engine
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// Local durable cache could not be read or written
    #[error("local storage unavailable: {reason}")]
    StorageUnavailable {
        /// Underlying failure
        reason: String,
    },
    /// Remote store did not answer within the configured bound
    #[error("remote store unreachable: {reason}")]
    Unreachable {
        /// Underlying failure
        reason: String,
    },
    /// Nothing to operate on
    #[error("{resource} not found")]
    NotFound {
        /// What was missing
        resource: String,
    },
    /// Another actor committed a newer version first, and re-applying the
    /// mutation on top of it conflicted again
    #[error("version conflict: expected {expected_version}, remote is at {current_version}")]
    Conflict {
        /// Version the failed write was based on
        expected_version: u64,
        /// Version currently held by the remote store
        current_version: u64,
        /// Remote document to use as the new base
        current: Box<WorkoutAssignment>,
    },
    /// A value could not be encoded or decoded
    #[error("serialization failed: {reason}")]
    Serialization {
        /// Underlying failure
        reason: String,
    },
    /// Mutation rejected before any write was attempted
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Offending field
        field: String,
        /// Why it was rejected
        reason: String,
    },
}

impl SyncError {
    /// Storage failure
    #[must_use]
    pub fn storage(reason: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            reason: reason.into(),
        }
    }

    /// Remote failure
    #[must_use]
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self::Unreachable {
            reason: reason.into(),
        }
    }

    /// Missing resource
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Encoding or decoding failure
    #[must_use]
    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::Serialization {
            reason: reason.into(),
        }
    }

    /// Rejected input
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Retrying later may succeed without caller action
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Unreachable { .. } | Self::StorageUnavailable { .. }
        )
    }

    /// The caller can recover by re-reading state or correcting input
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::Validation { .. })
    }

    /// Error code this variant maps to
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::StorageUnavailable { .. } => ErrorCode::StorageError,
            Self::Unreachable { .. } => ErrorCode::ExternalServiceUnavailable,
            Self::NotFound { .. } => ErrorCode::ResourceNotFound,
            Self::Conflict { .. } => ErrorCode::VersionConflict,
            Self::Serialization { .. } => ErrorCode::SerializationError,
            Self::Validation { .. } => ErrorCode::ValueOutOfRange,
        }
    }
}

impl From<SyncError> for AppError {
    fn from(error: SyncError) -> Self {
        Self::new(error.code(), error.to_string())
    }
}

impl From<AppError> for SyncError {
    fn from(error: AppError) -> Self {
        match error.code {
            ErrorCode::StorageError | ErrorCode::DatabaseError => Self::storage(error.message),
            ErrorCode::SerializationError => Self::serialization(error.message),
            ErrorCode::ResourceNotFound => Self::not_found(error.message),
            ErrorCode::InvalidInput | ErrorCode::ValueOutOfRange => {
                Self::validation("input", error.message)
            }
            _ => Self::unreachable(error.message),
        }
    }
}

/// Result alias for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_error_classification() {
        assert!(SyncError::unreachable("timeout").is_transient());
        assert!(SyncError::storage("disk").is_transient());
        assert!(SyncError::validation("reps", "negative").is_recoverable());
        assert!(!SyncError::not_found("assignment").is_recoverable());
    }

    #[test]
    fn test_sync_error_to_app_error() {
        let app: AppError = SyncError::validation("weight", "must be finite").into();
        assert_eq!(app.code, ErrorCode::ValueOutOfRange);
        assert!(app.message.contains("weight"));
    }

    #[test]
    fn test_serialization_keeps_its_category() {
        let sync: SyncError = AppError::serialization("bad json").into();
        assert!(matches!(sync, SyncError::Serialization { .. }));
        assert!(!sync.is_transient());
        assert_eq!(AppError::from(sync).code, ErrorCode::SerializationError);
    }
}
