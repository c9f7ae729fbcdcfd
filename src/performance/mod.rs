// ABOUTME: Performance tracking module for as-performed sets and training volume
// ABOUTME: Exposes the aggregator that maintains per-exercise, per-week and per-muscle-group volume
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Performance Aggregation
//!
//! Volume is `reps x weight` summed over completed sets only. Week totals and
//! muscle group buckets are rebuilt from the full exercise list on every
//! change rather than adjusted incrementally, so overwrites and removals can
//! never leave stale contributions behind.

mod aggregator;

pub use aggregator::{ExerciseRecord, PerformanceAggregator};
