// ABOUTME: As-performed training records and their weekly volume roll-ups
// ABOUTME: Set, exercise, week and root performance documents owned by the client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Actual values a client reports for one set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualSet {
    /// Identity of the set within the exercise
    pub set_id: String,
    /// Repetitions performed
    pub reps: u32,
    /// Load used
    pub weight: f64,
    /// Whether the set was finished
    #[serde(default)]
    pub completed: bool,
    /// Explicit completion time; derived when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ActualSet {
    /// Completed set with a derived completion time
    #[must_use]
    pub fn completed(set_id: impl Into<String>, reps: u32, weight: f64) -> Self {
        Self {
            set_id: set_id.into(),
            reps,
            weight,
            completed: true,
            completed_at: None,
        }
    }

    /// Set that was logged but not finished
    #[must_use]
    pub fn incomplete(set_id: impl Into<String>, reps: u32, weight: f64) -> Self {
        Self {
            set_id: set_id.into(),
            reps,
            weight,
            completed: false,
            completed_at: None,
        }
    }

    /// Training volume contributed by this set
    #[must_use]
    pub fn volume(&self) -> f64 {
        if self.completed {
            f64::from(self.reps) * self.weight
        } else {
            0.0
        }
    }
}

/// Planned against actual values for one set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPerformance {
    /// Identity of the set within the exercise
    pub set_id: String,
    /// Prescribed repetitions
    pub planned_reps: u32,
    /// Repetitions performed
    pub actual_reps: u32,
    /// Prescribed load
    pub planned_weight: f64,
    /// Load used
    pub actual_weight: f64,
    /// Whether the set was finished
    pub completed: bool,
    /// Present iff `completed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl SetPerformance {
    /// `actual_reps * actual_weight` for completed sets, zero otherwise
    #[must_use]
    pub fn volume(&self) -> f64 {
        if self.completed {
            f64::from(self.actual_reps) * self.actual_weight
        } else {
            0.0
        }
    }
}

/// Performance of one exercise in one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePerformance {
    /// Exercise identity from the assignment
    pub exercise_id: String,
    /// Display name
    pub exercise_name: String,
    /// Muscle group as entered
    pub muscle_group: String,
    /// Program day the exercise was performed on
    pub day_number: u32,
    /// Per-set records
    pub sets: Vec<SetPerformance>,
    /// Sum of completed set volume
    pub total_volume: f64,
    /// Latest set completion when every set is completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ExercisePerformance {
    /// Recompute `total_volume` and `completed_at` from `sets`
    pub fn recompute(&mut self) {
        self.total_volume = self.sets.iter().map(SetPerformance::volume).sum();
        self.completed_at = if !self.sets.is_empty() && self.sets.iter().all(|s| s.completed) {
            self.sets.iter().filter_map(|s| s.completed_at).max()
        } else {
            None
        };
    }
}

/// Aggregate of one program week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPerformance {
    /// Program week
    pub week_number: u32,
    /// Set by `markWeekCompleted`
    pub is_completed: bool,
    /// When the week was marked complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// One record per exercise id
    pub exercises: Vec<ExercisePerformance>,
    /// Sum of exercise volumes
    pub total_volume: f64,
    /// Volume keyed by lowercased muscle group
    pub muscle_group_volumes: BTreeMap<String, f64>,
}

impl WeeklyPerformance {
    /// Empty, not completed week
    #[must_use]
    pub const fn new(week_number: u32) -> Self {
        Self {
            week_number,
            is_completed: false,
            completed_at: None,
            exercises: Vec::new(),
            total_volume: 0.0,
            muscle_group_volumes: BTreeMap::new(),
        }
    }

    /// Rebuild week totals from the full exercise list
    pub fn rebuild_totals(&mut self) {
        let mut groups: BTreeMap<String, f64> = BTreeMap::new();
        let mut total = 0.0;
        for exercise in &self.exercises {
            total += exercise.total_volume;
            *groups
                .entry(normalize_muscle_group(&exercise.muscle_group))
                .or_insert(0.0) += exercise.total_volume;
        }
        self.total_volume = total;
        self.muscle_group_volumes = groups;
    }

    /// Volume recorded for a muscle group, case-insensitive
    #[must_use]
    pub fn muscle_group_volume(&self, muscle_group: &str) -> f64 {
        self.muscle_group_volumes
            .get(&normalize_muscle_group(muscle_group))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Root performance document per (client, assignment)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceData {
    /// Owning client
    pub client_id: Uuid,
    /// Assignment the records belong to
    pub workout_assignment_id: Uuid,
    /// Ordered by week number
    pub weekly_performances: Vec<WeeklyPerformance>,
    /// Last time the stored state changed
    pub last_updated: DateTime<Utc>,
}

impl PerformanceData {
    /// Empty root
    #[must_use]
    pub fn new(client_id: Uuid, workout_assignment_id: Uuid) -> Self {
        Self {
            client_id,
            workout_assignment_id,
            weekly_performances: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    /// Find a week
    #[must_use]
    pub fn week(&self, week_number: u32) -> Option<&WeeklyPerformance> {
        self.weekly_performances
            .iter()
            .find(|w| w.week_number == week_number)
    }

    /// Find a week for mutation
    pub fn week_mut(&mut self, week_number: u32) -> Option<&mut WeeklyPerformance> {
        self.weekly_performances
            .iter_mut()
            .find(|w| w.week_number == week_number)
    }

    /// Find or create a week
    ///
    /// Lookup does not rely on the list being sorted, since stored data may
    /// come from another writer. New weeks go before the first higher week.
    pub fn week_or_insert(&mut self, week_number: u32) -> &mut WeeklyPerformance {
        let position = match self
            .weekly_performances
            .iter()
            .position(|w| w.week_number == week_number)
        {
            Some(found) => found,
            None => {
                let insert_at = self
                    .weekly_performances
                    .iter()
                    .position(|w| w.week_number > week_number)
                    .unwrap_or(self.weekly_performances.len());
                self.weekly_performances
                    .insert(insert_at, WeeklyPerformance::new(week_number));
                insert_at
            }
        };
        &mut self.weekly_performances[position]
    }

    /// Restore week ordering on data read back from storage
    pub fn sort_weeks(&mut self) {
        self.weekly_performances.sort_by_key(|w| w.week_number);
    }
}

/// Canonical muscle group bucket key
#[must_use]
pub fn normalize_muscle_group(muscle_group: &str) -> String {
    muscle_group.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(id: &str, group: &str, volume: f64) -> ExercisePerformance {
        ExercisePerformance {
            exercise_id: id.to_owned(),
            exercise_name: id.to_owned(),
            muscle_group: group.to_owned(),
            day_number: 1,
            sets: Vec::new(),
            total_volume: volume,
            completed_at: None,
        }
    }

    #[test]
    fn test_rebuild_totals_groups_case_insensitively() {
        let mut week = WeeklyPerformance::new(1);
        week.exercises.push(exercise("bench", "Chest", 200.0));
        week.exercises.push(exercise("fly", "chest", 50.0));
        week.exercises.push(exercise("row", "Back", 100.0));
        week.rebuild_totals();

        assert!((week.total_volume - 350.0).abs() < f64::EPSILON);
        assert!((week.muscle_group_volume("CHEST") - 250.0).abs() < f64::EPSILON);
        assert!((week.muscle_group_volume("legs")).abs() < f64::EPSILON);
        assert_eq!(week.muscle_group_volumes.len(), 2);
    }

    #[test]
    fn test_week_or_insert_keeps_order() {
        let mut data = PerformanceData::new(Uuid::new_v4(), Uuid::new_v4());
        data.week_or_insert(3);
        data.week_or_insert(1);
        data.week_or_insert(2);
        data.week_or_insert(3);
        let weeks: Vec<u32> = data
            .weekly_performances
            .iter()
            .map(|w| w.week_number)
            .collect();
        assert_eq!(weeks, vec![1, 2, 3]);
    }

    #[test]
    fn test_week_or_insert_finds_week_in_unsorted_data() {
        let mut data = PerformanceData::new(Uuid::new_v4(), Uuid::new_v4());
        for week_number in [3, 1, 2] {
            data.weekly_performances.push(WeeklyPerformance::new(week_number));
        }

        data.week_or_insert(1).is_completed = true;
        data.week_or_insert(3);
        assert_eq!(data.weekly_performances.len(), 3, "no duplicate weeks");
        assert!(data.week(1).is_some_and(|w| w.is_completed));

        data.sort_weeks();
        let weeks: Vec<u32> = data
            .weekly_performances
            .iter()
            .map(|w| w.week_number)
            .collect();
        assert_eq!(weeks, vec![1, 2, 3]);
    }
}
