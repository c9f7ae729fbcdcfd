// ABOUTME: Core data models for coach-assigned workout programs
// ABOUTME: Re-exports the assignment document and the performance tracking records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! - `WorkoutAssignment`: the versioned document jointly edited by coach and client
//! - `PerformanceData`: the client-owned record of what was actually lifted
//!
//! Wire field names are camelCase so documents round-trip with the remote
//! store and the mobile app without renaming.

mod assignment;
mod performance;

pub use assignment::{Actor, PlannedSet, WeekUnlock, WorkoutAssignment, WorkoutDay, WorkoutExercise};
pub use performance::{
    normalize_muscle_group, ActualSet, ExercisePerformance, PerformanceData, SetPerformance,
    WeeklyPerformance,
};
