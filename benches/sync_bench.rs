// ABOUTME: Criterion benchmarks for the assignment sync write path
// ABOUTME: Measures set-edit throughput, conflict re-application and poll reconciliation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for the sync orchestrator.
//!
//! Runs against the in-process remote store so the numbers reflect the
//! orchestrator's own overhead: validation, versioned writes, cache updates
//! and event fan-out.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

mod common;

use common::fixtures::{generate_assignment, ProgramSize};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pierre_coach_sync::cache::memory::InMemoryCache;
use pierre_coach_sync::config::SyncConfig;
use pierre_coach_sync::models::{Actor, WorkoutAssignment};
use pierre_coach_sync::sync::{InMemoryRemoteStore, SetEdit, SetField, SyncOrchestrator};
use std::sync::Arc;
use tokio::runtime::Runtime;
use uuid::Uuid;

type Orchestrator = SyncOrchestrator<InMemoryRemoteStore, InMemoryCache>;

fn setup(rt: &Runtime, actor: Actor) -> (Arc<InMemoryRemoteStore>, WorkoutAssignment, Orchestrator) {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let assignment = generate_assignment(Uuid::new_v4(), ProgramSize::Small);
    let orchestrator = SyncOrchestrator::new(
        assignment.client_id,
        actor,
        Arc::clone(&remote),
        InMemoryCache::with_capacity(16),
        SyncConfig::for_tests(),
    );
    rt.block_on(async {
        remote.insert_assignment(assignment.clone()).await;
        orchestrator.load_assignment(None).await;
    });
    (remote, assignment, orchestrator)
}

fn edit(assignment: &WorkoutAssignment, value: f64) -> SetEdit {
    SetEdit {
        assignment_id: assignment.id,
        day_index: 0,
        exercise_id: "d0-e0".to_owned(),
        set_index: 0,
        field: SetField::Weight,
        value,
    }
}

/// Benchmark committed set edits, one versioned remote write each
fn bench_set_edit_commit(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (_remote, assignment, orchestrator) = setup(&rt, Actor::Client);

    c.bench_function("set_edit_commit", |b| {
        let mut value = 40.0;
        b.iter(|| {
            value += 0.5;
            rt.block_on(orchestrator.submit_set_edit(black_box(edit(&assignment, value))))
                .unwrap()
        });
    });
}

/// Benchmark edits staged locally while the remote is offline
fn bench_set_edit_pending(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (remote, assignment, orchestrator) = setup(&rt, Actor::Client);
    remote.set_reachable(false);

    c.bench_function("set_edit_pending", |b| {
        let mut value = 40.0;
        b.iter(|| {
            value += 0.5;
            rt.block_on(orchestrator.submit_set_edit(black_box(edit(&assignment, value))))
                .unwrap()
        });
    });
}

/// Benchmark an edit that loses the race and is re-applied once
fn bench_conflict_reapply(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (remote, assignment, client) = setup(&rt, Actor::Client);
    let coach = SyncOrchestrator::new(
        assignment.client_id,
        Actor::Coach,
        Arc::clone(&remote),
        InMemoryCache::with_capacity(16),
        SyncConfig::for_tests(),
    );
    rt.block_on(coach.load_assignment(None));

    c.bench_function("conflict_reapply", |b| {
        let mut value = 40.0;
        b.iter(|| {
            value += 0.5;
            rt.block_on(async {
                coach.poll_once().await;
                coach.submit_set_edit(edit(&assignment, value)).await.unwrap();
                client
                    .submit_set_edit(black_box(edit(&assignment, value + 0.25)))
                    .await
                    .unwrap()
            })
        });
    });
}

/// Benchmark a poll tick that finds nothing new
fn bench_poll_unchanged(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (_remote, _assignment, orchestrator) = setup(&rt, Actor::Client);

    c.bench_function("poll_unchanged", |b| {
        b.iter(|| rt.block_on(orchestrator.poll_once()));
    });
}

criterion_group!(
    benches,
    bench_set_edit_commit,
    bench_set_edit_pending,
    bench_conflict_reapply,
    bench_poll_unchanged
);
criterion_main!(benches);
