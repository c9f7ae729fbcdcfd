// ABOUTME: Records as-performed sets against the plan and rolls them up into weekly volume
// ABOUTME: Per-exercise overwrite semantics with week totals rebuilt from the full exercise list
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::cache::{CacheKey, CacheProvider};
use crate::errors::{SyncError, SyncResult};
use crate::models::{
    normalize_muscle_group, ActualSet, ExercisePerformance, PerformanceData, PlannedSet,
    SetPerformance, WeeklyPerformance,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// Everything the client reports for one exercise in one session
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseRecord {
    /// Program week (1-based)
    pub week_number: u32,
    /// Program day (1-based)
    pub day_number: u32,
    /// Exercise identity from the assignment
    pub exercise_id: String,
    /// Display name
    pub exercise_name: String,
    /// Muscle group used for roll-ups
    pub muscle_group: String,
    /// As-performed sets
    pub actual_sets: Vec<ActualSet>,
    /// Prescribed sets, zipped with `actual_sets` by index
    pub planned_sets: Vec<PlannedSet>,
}

impl ExerciseRecord {
    fn validate(&self) -> SyncResult<()> {
        if self.week_number == 0 {
            return Err(SyncError::validation("weekNumber", "must be at least 1"));
        }
        if self.day_number == 0 {
            return Err(SyncError::validation("dayNumber", "must be at least 1"));
        }
        if self.exercise_id.trim().is_empty() {
            return Err(SyncError::validation("exerciseId", "must not be empty"));
        }
        for set in &self.actual_sets {
            if !set.weight.is_finite() || set.weight < 0.0 {
                return Err(SyncError::validation(
                    "weight",
                    format!("set '{}' has invalid weight {}", set.set_id, set.weight),
                ));
            }
        }
        Ok(())
    }
}

type RecordKey = (Uuid, Uuid);

/// Client-owned performance tracking
///
/// Holds each (client, assignment) root in memory, hydrated lazily from the
/// cache on first use and written back after every change. A cache failure
/// leaves the in-memory copy authoritative for the rest of the process.
pub struct PerformanceAggregator<C: CacheProvider> {
    cache: C,
    // `None` marks a root that was looked up and does not exist yet
    records: Mutex<HashMap<RecordKey, Option<PerformanceData>>>,
}

impl<C: CacheProvider> PerformanceAggregator<C> {
    /// Create an aggregator persisting through `cache`
    #[must_use]
    pub fn new(cache: C) -> Self {
        Self {
            cache,
            records: Mutex::new(HashMap::new()),
        }
    }

    async fn hydrate<'a>(
        &self,
        records: &'a mut HashMap<RecordKey, Option<PerformanceData>>,
        client_id: Uuid,
        assignment_id: Uuid,
    ) -> &'a mut Option<PerformanceData> {
        let key = (client_id, assignment_id);
        if !records.contains_key(&key) {
            let loaded = match self
                .cache
                .get::<PerformanceData>(&CacheKey::performance(client_id, assignment_id))
                .await
            {
                Ok(data) => data.map(|mut data: PerformanceData| {
                    data.sort_weeks();
                    data
                }),
                Err(e) => {
                    warn!(
                        client_id = %client_id,
                        assignment_id = %assignment_id,
                        error = %e,
                        "Performance cache unreadable, continuing in memory"
                    );
                    None
                }
            };
            records.insert(key, loaded);
        }
        records.entry(key).or_insert(None)
    }

    async fn persist(&self, data: &PerformanceData) {
        let key = CacheKey::performance(data.client_id, data.workout_assignment_id);
        if let Err(e) = self.cache.set(&key, data).await {
            warn!(
                client_id = %data.client_id,
                assignment_id = %data.workout_assignment_id,
                error = %e,
                "Failed to persist performance data, keeping in-memory copy"
            );
        }
    }

    /// Record actual sets for one exercise, replacing any previous record of it
    ///
    /// Calling this twice with the same arguments leaves the stored state
    /// untouched the second time, `lastUpdated` included.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` for a zero week/day, an empty exercise id
    /// or a negative/non-finite weight
    pub async fn record_exercise_performance(
        &self,
        client_id: Uuid,
        assignment_id: Uuid,
        record: ExerciseRecord,
    ) -> SyncResult<ExercisePerformance> {
        record.validate()?;

        let mut records = self.records.lock().await;
        let slot = self.hydrate(&mut records, client_id, assignment_id).await;
        let mut data = slot
            .clone()
            .unwrap_or_else(|| PerformanceData::new(client_id, assignment_id));

        let now = Utc::now();
        let week = data.week_or_insert(record.week_number);
        let previous = week
            .exercises
            .iter()
            .find(|e| e.exercise_id == record.exercise_id)
            .cloned();

        let exercise = build_exercise(&record, previous.as_ref(), now);
        if previous.as_ref() == Some(&exercise) {
            debug!(
                exercise_id = %record.exercise_id,
                week = record.week_number,
                "Exercise performance unchanged"
            );
            return Ok(exercise);
        }

        match week
            .exercises
            .iter_mut()
            .find(|e| e.exercise_id == record.exercise_id)
        {
            Some(existing) => *existing = exercise.clone(),
            None => week.exercises.push(exercise.clone()),
        }
        week.rebuild_totals();
        data.last_updated = now;

        self.persist(&data).await;
        *slot = Some(data);
        drop(records);

        debug!(
            client_id = %client_id,
            exercise_id = %exercise.exercise_id,
            week = record.week_number,
            volume = exercise.total_volume,
            "Recorded exercise performance"
        );
        Ok(exercise)
    }

    /// Mark a week as completed
    ///
    /// Returns `false` without error when the week has no recorded performance
    /// or is already completed (the first completion time is kept).
    pub async fn mark_week_completed(
        &self,
        client_id: Uuid,
        assignment_id: Uuid,
        week_number: u32,
    ) -> bool {
        let mut records = self.records.lock().await;
        let slot = self.hydrate(&mut records, client_id, assignment_id).await;
        let Some(data) = slot.as_mut() else {
            return false;
        };
        let now = Utc::now();
        let Some(week) = data.week_mut(week_number) else {
            debug!(week = week_number, "No performance recorded for week, nothing to complete");
            return false;
        };
        if week.is_completed {
            return false;
        }
        week.is_completed = true;
        week.completed_at = Some(now);
        data.last_updated = now;
        let snapshot = data.clone();
        self.persist(&snapshot).await;
        true
    }

    /// Drop one exercise from a week and rebuild the week totals
    pub async fn remove_exercise_performance(
        &self,
        client_id: Uuid,
        assignment_id: Uuid,
        week_number: u32,
        exercise_id: &str,
    ) -> bool {
        let mut records = self.records.lock().await;
        let slot = self.hydrate(&mut records, client_id, assignment_id).await;
        let Some(data) = slot.as_mut() else {
            return false;
        };
        let Some(week) = data.week_mut(week_number) else {
            return false;
        };
        let before = week.exercises.len();
        week.exercises.retain(|e| e.exercise_id != exercise_id);
        if week.exercises.len() == before {
            return false;
        }
        week.rebuild_totals();
        data.last_updated = Utc::now();
        let snapshot = data.clone();
        self.persist(&snapshot).await;
        true
    }

    /// Full performance root, if anything was recorded
    pub async fn performance_data(
        &self,
        client_id: Uuid,
        assignment_id: Uuid,
    ) -> Option<PerformanceData> {
        let mut records = self.records.lock().await;
        self.hydrate(&mut records, client_id, assignment_id)
            .await
            .clone()
    }

    /// One week's aggregate
    pub async fn weekly_performance(
        &self,
        client_id: Uuid,
        assignment_id: Uuid,
        week_number: u32,
    ) -> Option<WeeklyPerformance> {
        self.performance_data(client_id, assignment_id)
            .await
            .and_then(|data| data.week(week_number).cloned())
    }

    /// One exercise's record within a week
    pub async fn exercise_performance(
        &self,
        client_id: Uuid,
        assignment_id: Uuid,
        week_number: u32,
        exercise_id: &str,
    ) -> Option<ExercisePerformance> {
        self.weekly_performance(client_id, assignment_id, week_number)
            .await
            .and_then(|week| {
                week.exercises
                    .into_iter()
                    .find(|e| e.exercise_id == exercise_id)
            })
    }

    /// Total volume for a week, `0` when nothing was recorded
    pub async fn weekly_volume(&self, client_id: Uuid, assignment_id: Uuid, week: u32) -> f64 {
        self.weekly_performance(client_id, assignment_id, week)
            .await
            .map_or(0.0, |w| w.total_volume)
    }

    /// Volume for a muscle group in a week, case-insensitive, `0` when absent
    pub async fn muscle_group_volume(
        &self,
        client_id: Uuid,
        assignment_id: Uuid,
        week: u32,
        muscle_group: &str,
    ) -> f64 {
        self.weekly_performance(client_id, assignment_id, week)
            .await
            .map_or(0.0, |w| w.muscle_group_volume(muscle_group))
    }

    /// Whether a week was marked completed, `false` when absent
    pub async fn is_week_completed(&self, client_id: Uuid, assignment_id: Uuid, week: u32) -> bool {
        self.weekly_performance(client_id, assignment_id, week)
            .await
            .is_some_and(|w| w.is_completed)
    }

    /// Volume per muscle group summed over every recorded week
    pub async fn total_volume_by_muscle_group(
        &self,
        client_id: Uuid,
        assignment_id: Uuid,
    ) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        if let Some(data) = self.performance_data(client_id, assignment_id).await {
            for week in &data.weekly_performances {
                for (group, volume) in &week.muscle_group_volumes {
                    *totals.entry(normalize_muscle_group(group)).or_insert(0.0) += volume;
                }
            }
        }
        totals
    }
}

fn build_exercise(
    record: &ExerciseRecord,
    previous: Option<&ExercisePerformance>,
    now: DateTime<Utc>,
) -> ExercisePerformance {
    let sets = record
        .actual_sets
        .iter()
        .enumerate()
        .map(|(index, actual)| {
            let planned = record.planned_sets.get(index).copied().unwrap_or_default();
            let completed_at = actual.completed.then(|| {
                actual
                    .completed_at
                    .or_else(|| carried_completion(previous, &actual.set_id))
                    .unwrap_or(now)
            });
            SetPerformance {
                set_id: actual.set_id.clone(),
                planned_reps: planned.reps,
                actual_reps: actual.reps,
                planned_weight: planned.weight,
                actual_weight: actual.weight,
                completed: actual.completed,
                completed_at,
            }
        })
        .collect();

    let mut exercise = ExercisePerformance {
        exercise_id: record.exercise_id.clone(),
        exercise_name: record.exercise_name.clone(),
        muscle_group: record.muscle_group.clone(),
        day_number: record.day_number,
        sets,
        total_volume: 0.0,
        completed_at: None,
    };
    exercise.recompute();
    exercise
}

/// Completion time of an already-completed set with the same id
fn carried_completion(
    previous: Option<&ExercisePerformance>,
    set_id: &str,
) -> Option<DateTime<Utc>> {
    previous?
        .sets
        .iter()
        .find(|s| s.set_id == set_id && s.completed)
        .and_then(|s| s.completed_at)
}
