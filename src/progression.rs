// ABOUTME: Derives the set of reachable program weeks from coach-controlled unlock flags
// ABOUTME: Pure functions; week 1 is always reachable even with no unlock data
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Week Progression
//!
//! Unlocking is an explicit coach action stored in the assignment document.
//! Nothing here advances a week because the previous one was completed.

use crate::constants::sync::DEFAULT_UNLOCKED_WEEK;
use crate::models::WeekUnlock;
use std::collections::BTreeSet;

/// Collect the unlocked week numbers, defaulting to `{1}` when none are unlocked
#[must_use]
pub fn resolve_unlocked_weeks(weeks: &[WeekUnlock]) -> BTreeSet<u32> {
    let unlocked: BTreeSet<u32> = weeks
        .iter()
        .filter(|w| w.is_unlocked)
        .map(|w| w.week_number)
        .collect();

    if unlocked.is_empty() {
        BTreeSet::from([DEFAULT_UNLOCKED_WEEK])
    } else {
        unlocked
    }
}

/// Whether `week` is in the resolved set
#[must_use]
pub fn is_week_reachable(unlocked: &BTreeSet<u32>, week: u32) -> bool {
    unlocked.contains(&week)
}

/// Highest reachable week, used to clamp the advisory cursor
#[must_use]
pub fn latest_reachable_week(unlocked: &BTreeSet<u32>) -> u32 {
    unlocked
        .last()
        .copied()
        .unwrap_or(DEFAULT_UNLOCKED_WEEK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weeks(flags: &[bool]) -> Vec<WeekUnlock> {
        flags
            .iter()
            .enumerate()
            .map(|(i, &is_unlocked)| WeekUnlock {
                week_number: i as u32 + 1,
                is_unlocked,
            })
            .collect()
    }

    #[test]
    fn test_returns_exactly_the_unlocked_weeks() {
        let resolved = resolve_unlocked_weeks(&weeks(&[true, false, true, false]));
        assert_eq!(resolved, BTreeSet::from([1, 3]));
    }

    #[test]
    fn test_unlocked_set_need_not_include_week_one() {
        let resolved = resolve_unlocked_weeks(&weeks(&[false, true]));
        assert_eq!(resolved, BTreeSet::from([2]));
        assert!(!is_week_reachable(&resolved, 1));
    }

    #[test]
    fn test_all_locked_defaults_to_week_one() {
        assert_eq!(
            resolve_unlocked_weeks(&weeks(&[false, false, false])),
            BTreeSet::from([1])
        );
    }

    #[test]
    fn test_empty_defaults_to_week_one() {
        let resolved = resolve_unlocked_weeks(&[]);
        assert_eq!(resolved, BTreeSet::from([1]));
        assert!(is_week_reachable(&resolved, 1));
        assert!(!is_week_reachable(&resolved, 2));
    }

    #[test]
    fn test_latest_reachable_week() {
        let resolved = resolve_unlocked_weeks(&weeks(&[true, true, false, true]));
        assert_eq!(latest_reachable_week(&resolved), 4);
        assert_eq!(latest_reachable_week(&BTreeSet::new()), 1);
    }
}
