// ABOUTME: Validated edits to an assignment document: set values, week unlocks, cursors
// ABOUTME: Every edit is checked before any write so malformed input never reaches the remote store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{SyncError, SyncResult};
use crate::models::WorkoutAssignment;
use crate::progression;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Numeric field of a planned set a client may edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetField {
    /// Repetitions, whole numbers only
    Reps,
    /// Load
    Weight,
}

impl SetField {
    /// Parse from CLI/wire form
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` for anything other than `reps`/`weight`
    pub fn parse(s: &str) -> SyncResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "reps" => Ok(Self::Reps),
            "weight" => Ok(Self::Weight),
            other => Err(SyncError::validation(
                "field",
                format!("unknown set field '{other}', expected reps or weight"),
            )),
        }
    }
}

impl fmt::Display for SetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reps => f.write_str("reps"),
            Self::Weight => f.write_str("weight"),
        }
    }
}

/// Edit of one numeric field of one planned set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetEdit {
    /// Assignment the edit targets
    pub assignment_id: Uuid,
    /// 0-based index into `program`
    pub day_index: usize,
    /// Exercise within the day
    pub exercise_id: String,
    /// 0-based index into the exercise's sets
    pub set_index: usize,
    /// Field to change
    pub field: SetField,
    /// New value
    pub value: f64,
}

impl SetEdit {
    /// Check the value on its own, without a document
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` for negative, non-finite or fractional-rep values
    pub fn validate_value(&self) -> SyncResult<()> {
        let field = self.field.to_string();
        if !self.value.is_finite() {
            return Err(SyncError::validation(field, "must be a finite number"));
        }
        if self.value < 0.0 {
            return Err(SyncError::validation(
                field,
                format!("must not be negative, got {}", self.value),
            ));
        }
        if self.field == SetField::Reps
            && (self.value.fract() != 0.0 || self.value > f64::from(u32::MAX))
        {
            return Err(SyncError::validation(
                field,
                format!("must be a whole number, got {}", self.value),
            ));
        }
        Ok(())
    }

    /// Check the edit against the document it would be applied to
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` for a bad value, a different assignment,
    /// an unknown day/exercise or an out-of-range set index
    pub fn validate(&self, document: &WorkoutAssignment) -> SyncResult<()> {
        self.validate_value()?;
        if document.id != self.assignment_id {
            return Err(SyncError::validation(
                "assignmentId",
                format!(
                    "edit targets {} but the active assignment is {}",
                    self.assignment_id, document.id
                ),
            ));
        }
        if self.day_index >= document.program.len() {
            return Err(SyncError::validation(
                "dayIndex",
                format!(
                    "{} is out of range for a {}-day program",
                    self.day_index,
                    document.program.len()
                ),
            ));
        }
        let exercise = document
            .exercise(self.day_index, &self.exercise_id)
            .ok_or_else(|| {
                SyncError::validation(
                    "exerciseId",
                    format!("'{}' is not on day {}", self.exercise_id, self.day_index),
                )
            })?;
        if self.set_index >= exercise.sets.len() {
            return Err(SyncError::validation(
                "setIndex",
                format!(
                    "{} is out of range for {} sets",
                    self.set_index,
                    exercise.sets.len()
                ),
            ));
        }
        Ok(())
    }

    /// Validate and apply to `document`
    ///
    /// # Errors
    ///
    /// Same as [`SetEdit::validate`]
    pub fn apply(&self, document: &mut WorkoutAssignment) -> SyncResult<()> {
        self.validate(document)?;
        let set = document
            .exercise_mut(self.day_index, &self.exercise_id)
            .and_then(|exercise| exercise.sets.get_mut(self.set_index))
            .ok_or_else(|| SyncError::validation("setIndex", "set disappeared"))?;
        match self.field {
            // whole and within u32 range, checked in validate_value
            SetField::Reps => set.reps = self.value as u32,
            SetField::Weight => set.weight = self.value,
        }
        Ok(())
    }
}

/// Flip the coach-controlled unlock flag of one week
///
/// # Errors
///
/// Returns `SyncError::Validation` if the week does not exist
pub fn set_week_unlocked(
    document: &mut WorkoutAssignment,
    week_number: u32,
    unlocked: bool,
) -> SyncResult<()> {
    let week = document.week_mut(week_number).ok_or_else(|| {
        SyncError::validation("weekNumber", format!("week {week_number} does not exist"))
    })?;
    week.is_unlocked = unlocked;
    Ok(())
}

/// Move the advisory week/day cursors
///
/// # Errors
///
/// Returns `SyncError::Validation` if the week is not reachable or the day is
/// outside the program
pub fn set_cursor(document: &mut WorkoutAssignment, week: u32, day: u32) -> SyncResult<()> {
    let unlocked = progression::resolve_unlocked_weeks(&document.weeks);
    if !progression::is_week_reachable(&unlocked, week) {
        return Err(SyncError::validation(
            "currentWeek",
            format!("week {week} is locked"),
        ));
    }
    let days = u32::try_from(document.program.len()).unwrap_or(u32::MAX);
    if day == 0 || day > days {
        return Err(SyncError::validation(
            "currentDay",
            format!("day {day} is out of range for a {days}-day program"),
        ));
    }
    document.current_week = week;
    document.current_day = day;
    Ok(())
}
