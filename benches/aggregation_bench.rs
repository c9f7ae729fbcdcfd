// ABOUTME: Criterion benchmarks for training volume aggregation
// ABOUTME: Measures exercise recording, idempotent re-recording and volume queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for the performance aggregator.
//!
//! Measures the cost of recording a full week of exercises, of re-recording
//! unchanged data and of the weekly and muscle-group volume lookups.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

mod common;

use common::fixtures::{generate_assignment, generate_week_records, ProgramSize};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pierre_coach_sync::cache::memory::InMemoryCache;
use pierre_coach_sync::performance::PerformanceAggregator;
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Benchmark recording one week of exercises into a fresh aggregate
fn bench_record_week(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("record_week");

    for size in [ProgramSize::Small, ProgramSize::Large] {
        let client_id = Uuid::from_u128(1);
        let assignment = generate_assignment(client_id, size);
        let records = generate_week_records(&assignment, 1);

        group.throughput(Throughput::Elements(records.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("memory", size.name()),
            &records,
            |b, records| {
                b.iter(|| {
                    let performance = PerformanceAggregator::new(InMemoryCache::with_capacity(16));
                    rt.block_on(async {
                        for record in records {
                            performance
                                .record_exercise_performance(
                                    client_id,
                                    assignment.id,
                                    black_box(record.clone()),
                                )
                                .await
                                .unwrap();
                        }
                    });
                });
            },
        );
    }

    group.finish();
}

/// Benchmark re-recording identical data (the no-change path)
fn bench_rerecord_unchanged(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let client_id = Uuid::from_u128(2);
    let assignment = generate_assignment(client_id, ProgramSize::Large);
    let records = generate_week_records(&assignment, 1);
    let performance = PerformanceAggregator::new(InMemoryCache::with_capacity(16));
    rt.block_on(async {
        for record in &records {
            performance
                .record_exercise_performance(client_id, assignment.id, record.clone())
                .await
                .unwrap();
        }
    });

    c.bench_function("rerecord_unchanged", |b| {
        let mut index = 0_usize;
        b.iter(|| {
            let record = records[index % records.len()].clone();
            index = index.wrapping_add(1);
            rt.block_on(async {
                performance
                    .record_exercise_performance(client_id, assignment.id, black_box(record))
                    .await
                    .unwrap()
            })
        });
    });
}

/// Benchmark volume queries over a twelve-week history
fn bench_volume_queries(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("volume_queries");
    let client_id = Uuid::from_u128(3);
    let assignment = generate_assignment(client_id, ProgramSize::Large);
    let performance = PerformanceAggregator::new(InMemoryCache::with_capacity(16));
    rt.block_on(async {
        for week in 1..=12 {
            for record in generate_week_records(&assignment, week) {
                performance
                    .record_exercise_performance(client_id, assignment.id, record)
                    .await
                    .unwrap();
            }
            performance
                .mark_week_completed(client_id, assignment.id, week)
                .await;
        }
    });

    group.bench_function("weekly_volume", |b| {
        b.iter(|| {
            rt.block_on(performance.weekly_volume(client_id, assignment.id, black_box(6)))
        });
    });

    group.bench_function("muscle_group_volume", |b| {
        b.iter(|| {
            rt.block_on(performance.muscle_group_volume(
                client_id,
                assignment.id,
                black_box(6),
                black_box("CHEST"),
            ))
        });
    });

    group.bench_function("total_by_muscle_group", |b| {
        b.iter(|| rt.block_on(performance.total_volume_by_muscle_group(client_id, assignment.id)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_record_week,
    bench_rerecord_unchanged,
    bench_volume_queries
);
criterion_main!(benches);
