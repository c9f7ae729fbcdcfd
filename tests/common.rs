// ABOUTME: Shared test utilities and fixtures for the sync engine integration tests
// ABOUTME: Provides quiet logging, sample assignments and orchestrator builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `pierre_coach_sync`

use pierre_coach_sync::cache::memory::InMemoryCache;
use pierre_coach_sync::config::SyncConfig;
use pierre_coach_sync::models::{Actor, PlannedSet, WorkoutAssignment, WorkoutDay, WorkoutExercise};
use pierre_coach_sync::sync::{InMemoryRemoteStore, SetEdit, SetField, SyncEvent, SyncOrchestrator};
use std::sync::{Arc, Once};
use tokio::sync::broadcast;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

pub fn exercise(id: &str, name: &str, muscle_group: &str, sets: usize) -> WorkoutExercise {
    WorkoutExercise {
        id: id.to_owned(),
        name: name.to_owned(),
        muscle_group: muscle_group.to_owned(),
        sets: vec![PlannedSet::new(8, 60.0); sets],
        notes: None,
    }
}

/// Two-day, four-week program at version 0, week 1 unlocked
pub fn sample_assignment(client_id: Uuid) -> WorkoutAssignment {
    let program = vec![
        WorkoutDay {
            day_number: 1,
            name: Some("Push".to_owned()),
            exercises: vec![
                exercise("bench", "Bench Press", "chest", 3),
                exercise("fly", "Cable Fly", "Chest", 2),
            ],
        },
        WorkoutDay {
            day_number: 2,
            name: Some("Legs".to_owned()),
            exercises: vec![exercise("squat", "Back Squat", "legs", 3)],
        },
    ];
    WorkoutAssignment::new(client_id, program, 4)
}

/// Same assignment, already at `version` on the remote store
pub fn assignment_at_version(client_id: Uuid, version: u64) -> WorkoutAssignment {
    let mut assignment = sample_assignment(client_id);
    assignment.stamp(version, Actor::Coach);
    assignment
}

/// Remote store seeded with one assignment for a new client
pub async fn seeded_remote() -> (Arc<InMemoryRemoteStore>, WorkoutAssignment) {
    init_test_logging();
    let remote = Arc::new(InMemoryRemoteStore::new());
    let assignment = sample_assignment(Uuid::new_v4());
    remote.insert_assignment(assignment.clone()).await;
    (remote, assignment)
}

pub fn memory_cache() -> InMemoryCache {
    InMemoryCache::with_capacity(64)
}

pub fn orchestrator(
    remote: &Arc<InMemoryRemoteStore>,
    client_id: Uuid,
    actor: Actor,
    cache: InMemoryCache,
) -> SyncOrchestrator<InMemoryRemoteStore, InMemoryCache> {
    SyncOrchestrator::new(
        client_id,
        actor,
        Arc::clone(remote),
        cache,
        SyncConfig::for_tests(),
    )
}

pub fn weight_edit(assignment: &WorkoutAssignment, set_index: usize, value: f64) -> SetEdit {
    SetEdit {
        assignment_id: assignment.id,
        day_index: 0,
        exercise_id: "bench".to_owned(),
        set_index,
        field: SetField::Weight,
        value,
    }
}

pub fn reps_edit(assignment: &WorkoutAssignment, set_index: usize, value: f64) -> SetEdit {
    SetEdit {
        field: SetField::Reps,
        ..weight_edit(assignment, set_index, value)
    }
}

/// Everything buffered on an event receiver right now
pub fn drain_events(events: &mut broadcast::Receiver<SyncEvent>) -> Vec<SyncEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
