// ABOUTME: Core types and constants for the Pierre coaching sync engine
// ABOUTME: Foundation crate with error handling, constants, and the assignment data model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pierre Core
//!
//! Foundation crate shared by the sync engine and its CLI. It is designed to
//! change infrequently, enabling incremental compilation benefits in the
//! workspace.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode`, and the typed `SyncError` taxonomy
//! - **constants**: timing, capacity and environment variable names
//! - **models**: `WorkoutAssignment` and `PerformanceData`

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Workout assignment and performance data models
pub mod models;
