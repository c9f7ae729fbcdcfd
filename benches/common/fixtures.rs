// ABOUTME: Benchmark fixtures for generating workout programs and performance records
// ABOUTME: Provides deterministic data generation for reproducible performance measurements
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Benchmark fixtures for generating workout programs and performance records.

use pierre_coach_sync::models::{
    ActualSet, PlannedSet, WorkoutAssignment, WorkoutDay, WorkoutExercise,
};
use pierre_coach_sync::performance::ExerciseRecord;
use uuid::Uuid;

const MUSCLE_GROUPS: [&str; 6] = ["chest", "Back", "legs", "Shoulders", "arms", "core"];

/// Program shapes used across benchmark scenarios
#[derive(Debug, Clone, Copy)]
pub enum ProgramSize {
    /// Three days of four exercises
    Small,
    /// Five days of eight exercises
    Large,
}

impl ProgramSize {
    #[must_use]
    pub const fn days(self) -> usize {
        match self {
            Self::Small => 3,
            Self::Large => 5,
        }
    }

    #[must_use]
    pub const fn exercises_per_day(self) -> usize {
        match self {
            Self::Small => 4,
            Self::Large => 8,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Small => "3x4",
            Self::Large => "5x8",
        }
    }
}

/// Twelve-week assignment of the given shape, four sets per exercise
#[must_use]
pub fn generate_assignment(client_id: Uuid, size: ProgramSize) -> WorkoutAssignment {
    let program = (0..size.days())
        .map(|day| WorkoutDay {
            day_number: day as u32 + 1,
            name: Some(format!("Day {}", day + 1)),
            exercises: (0..size.exercises_per_day())
                .map(|index| WorkoutExercise {
                    id: format!("d{day}-e{index}"),
                    name: format!("Exercise {index}"),
                    muscle_group: MUSCLE_GROUPS[index % MUSCLE_GROUPS.len()].to_owned(),
                    sets: vec![PlannedSet::new(8, 40.0 + index as f64 * 5.0); 4],
                    notes: None,
                })
                .collect(),
        })
        .collect();
    WorkoutAssignment::new(client_id, program, 12)
}

/// One record per exercise of `assignment` for `week`, last set left incomplete
#[must_use]
pub fn generate_week_records(assignment: &WorkoutAssignment, week: u32) -> Vec<ExerciseRecord> {
    assignment
        .program
        .iter()
        .flat_map(|day| {
            day.exercises.iter().map(move |exercise| {
                let last = exercise.sets.len().saturating_sub(1);
                ExerciseRecord {
                    week_number: week,
                    day_number: day.day_number,
                    exercise_id: exercise.id.clone(),
                    exercise_name: exercise.name.clone(),
                    muscle_group: exercise.muscle_group.clone(),
                    actual_sets: exercise
                        .sets
                        .iter()
                        .enumerate()
                        .map(|(i, planned)| {
                            let id = format!("s{i}");
                            if i == last {
                                ActualSet::incomplete(id, planned.reps / 2, planned.weight)
                            } else {
                                ActualSet::completed(id, planned.reps, planned.weight + f64::from(week))
                            }
                        })
                        .collect(),
                    planned_sets: exercise.sets.clone(),
                }
            })
        })
        .collect()
}
