// ABOUTME: Versioned workout assignment document shared between a coach and a client
// ABOUTME: Program days, exercises, planned sets, week unlock flags, and version attribution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::sync::INITIAL_VERSION;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Which side of the coaching relationship produced a document version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    /// The coach who owns the program
    Coach,
    /// The client following the program
    #[default]
    Client,
}

impl Actor {
    /// String form used in cache rows and HTTP payloads
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Coach => "coach",
            Self::Client => "client",
        }
    }

    /// Parse from the string form, defaulting to `Client`
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "coach" => Self::Coach,
            _ => Self::Client,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Planned values for one set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PlannedSet {
    /// Target repetitions
    pub reps: u32,
    /// Target load
    pub weight: f64,
}

impl PlannedSet {
    /// Build a planned set
    #[must_use]
    pub const fn new(reps: u32, weight: f64) -> Self {
        Self { reps, weight }
    }
}

/// One exercise inside a workout day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    /// Stable identity within the day
    pub id: String,
    /// Display name
    pub name: String,
    /// Muscle group used for volume roll-ups
    #[serde(default)]
    pub muscle_group: String,
    /// Planned sets, editable by both actors (numeric fields only for the client)
    #[serde(default)]
    pub sets: Vec<PlannedSet>,
    /// Coach notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A single training day of the program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDay {
    /// 1-based position in the program
    pub day_number: u32,
    /// Optional label ("Push", "Legs", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Ordered exercises
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
}

/// Unlock flag for one program week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekUnlock {
    /// Positive, unique, contiguous from 1
    pub week_number: u32,
    /// Set by the coach
    pub is_unlocked: bool,
}

/// The versioned document tying a client to a program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutAssignment {
    /// Stable for the lifetime of the active assignment
    pub id: Uuid,
    /// Owning client
    pub client_id: Uuid,
    /// Ordered workout days
    #[serde(default)]
    pub program: Vec<WorkoutDay>,
    /// Week unlock state
    #[serde(default)]
    pub weeks: Vec<WeekUnlock>,
    /// Advisory 1-based week cursor
    #[serde(default = "default_cursor")]
    pub current_week: u32,
    /// Advisory 1-based day cursor
    #[serde(default = "default_cursor")]
    pub current_day: u32,
    /// Strictly increasing on every successful remote write
    #[serde(default)]
    pub version: u64,
    /// Actor that produced `version`
    #[serde(default)]
    pub last_modified_by: Actor,
    /// When `version` was produced
    pub last_modified_at: DateTime<Utc>,
}

const fn default_cursor() -> u32 {
    1
}

impl WorkoutAssignment {
    /// Create a fresh coach-authored assignment at version 0 with `week_count`
    /// weeks, only the first of which is unlocked
    #[must_use]
    pub fn new(client_id: Uuid, program: Vec<WorkoutDay>, week_count: u32) -> Self {
        let weeks = (1..=week_count)
            .map(|week_number| WeekUnlock {
                week_number,
                is_unlocked: week_number == 1,
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            client_id,
            program,
            weeks,
            current_week: 1,
            current_day: 1,
            version: INITIAL_VERSION,
            last_modified_by: Actor::Coach,
            last_modified_at: Utc::now(),
        }
    }

    /// Check the structural invariants of the `weeks` list
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant
    pub fn check_weeks(&self) -> Result<(), String> {
        for (index, week) in self.weeks.iter().enumerate() {
            let expected = index as u32 + 1;
            if week.week_number != expected {
                return Err(format!(
                    "week numbers must be contiguous from 1: found {} at position {}",
                    week.week_number, expected
                ));
            }
        }
        Ok(())
    }

    /// Find a week unlock entry
    #[must_use]
    pub fn week(&self, week_number: u32) -> Option<&WeekUnlock> {
        self.weeks.iter().find(|w| w.week_number == week_number)
    }

    /// Mutable access to a week unlock entry
    pub fn week_mut(&mut self, week_number: u32) -> Option<&mut WeekUnlock> {
        self.weeks.iter_mut().find(|w| w.week_number == week_number)
    }

    /// Look up an exercise by day index and exercise id
    #[must_use]
    pub fn exercise(&self, day_index: usize, exercise_id: &str) -> Option<&WorkoutExercise> {
        self.program
            .get(day_index)?
            .exercises
            .iter()
            .find(|e| e.id == exercise_id)
    }

    /// Mutable lookup of an exercise by day index and exercise id
    pub fn exercise_mut(
        &mut self,
        day_index: usize,
        exercise_id: &str,
    ) -> Option<&mut WorkoutExercise> {
        self.program
            .get_mut(day_index)?
            .exercises
            .iter_mut()
            .find(|e| e.id == exercise_id)
    }

    /// Stamp attribution after a committed or locally-staged write
    pub fn stamp(&mut self, version: u64, actor: Actor) {
        self.version = version;
        self.last_modified_by = actor;
        self.last_modified_at = Utc::now();
    }

    /// Whether `other` differs only in attribution fields
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        self.id == other.id
            && self.client_id == other.client_id
            && self.program == other.program
            && self.weeks == other.weeks
            && self.current_week == other.current_week
            && self.current_day == other.current_day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_assignment_unlocks_first_week_only() {
        let assignment = WorkoutAssignment::new(Uuid::new_v4(), Vec::new(), 4);
        assert_eq!(assignment.weeks.len(), 4);
        assert!(assignment.weeks[0].is_unlocked);
        assert!(assignment.weeks[1..].iter().all(|w| !w.is_unlocked));
        assert!(assignment.check_weeks().is_ok());
    }

    #[test]
    fn test_check_weeks_rejects_gaps() {
        let mut assignment = WorkoutAssignment::new(Uuid::new_v4(), Vec::new(), 3);
        assignment.weeks[2].week_number = 5;
        assert!(assignment.check_weeks().is_err());
    }

    #[test]
    fn test_wire_names_are_camel_case() -> Result<(), serde_json::Error> {
        let assignment = WorkoutAssignment::new(Uuid::new_v4(), Vec::new(), 1);
        let json = serde_json::to_value(&assignment)?;
        assert!(json.get("clientId").is_some());
        assert!(json.get("lastModifiedBy").is_some());
        assert_eq!(json["weeks"][0]["isUnlocked"], serde_json::Value::Bool(true));
        assert_eq!(json["lastModifiedBy"], "coach");
        Ok(())
    }
}
