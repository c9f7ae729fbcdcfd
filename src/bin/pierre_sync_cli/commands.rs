// ABOUTME: Subcommand handlers for pierre-sync, generic over the remote store backend
// ABOUTME: Each handler loads the assignment first and prints its result as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::Command;
use pierre_coach_sync::cache::factory::Cache;
use pierre_coach_sync::config::SyncConfig;
use pierre_coach_sync::errors::{SyncError, SyncResult};
use pierre_coach_sync::models::{
    Actor, ActualSet, PlannedSet, WorkoutAssignment, WorkoutDay, WorkoutExercise,
};
use pierre_coach_sync::performance::ExerciseRecord;
use pierre_coach_sync::sync::{RemoteStore, SetEdit, SetField, SyncOrchestrator};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;
use uuid::Uuid;

fn print_json<T: Serialize>(value: &T) -> SyncResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| SyncError::serialization(format!("Failed to encode output: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Run one subcommand against a freshly loaded orchestrator
pub(crate) async fn execute<R: RemoteStore>(
    command: Command,
    client_id: Uuid,
    actor: Actor,
    remote: Arc<R>,
    cache: Cache,
    config: SyncConfig,
) -> SyncResult<()> {
    let orchestrator = SyncOrchestrator::new(client_id, actor, remote, cache, config);
    let loaded = orchestrator.load_assignment(None).await;

    let result = match command {
        Command::Load => print_json(&loaded),
        Command::EditSet {
            day_index,
            exercise_id,
            set_index,
            field,
            value,
        } => {
            let assignment_id = loaded
                .assignment
                .as_ref()
                .map(|doc| doc.id)
                .ok_or_else(|| SyncError::not_found("workout assignment"))?;
            let outcome = orchestrator
                .submit_set_edit(SetEdit {
                    assignment_id,
                    day_index,
                    exercise_id,
                    set_index,
                    field: SetField::parse(&field)?,
                    value,
                })
                .await?;
            print_json(&json!({
                "outcome": outcome,
                "syncState": orchestrator.sync_state().await,
            }))
        }
        Command::UnlockWeek { week, lock } => {
            let outcome = orchestrator.set_week_unlocked(week, !lock).await?;
            print_json(&json!({
                "outcome": outcome,
                "unlockedWeeks": orchestrator.unlocked_weeks().await,
            }))
        }
        Command::Record {
            week,
            day,
            exercise_id,
            exercise_name,
            muscle_group,
            sets,
        } => {
            let planned = loaded.assignment.as_ref().and_then(|doc| {
                doc.exercise(day.saturating_sub(1) as usize, &exercise_id)
                    .cloned()
            });
            let actual_sets = sets
                .iter()
                .map(String::as_str)
                .map(parse_set)
                .collect::<SyncResult<Vec<_>>>()?;
            let record = ExerciseRecord {
                week_number: week,
                day_number: day,
                exercise_name: exercise_name
                    .or_else(|| planned.as_ref().map(|e| e.name.clone()))
                    .unwrap_or_else(|| exercise_id.clone()),
                muscle_group: muscle_group
                    .or_else(|| planned.as_ref().map(|e| e.muscle_group.clone()))
                    .unwrap_or_default(),
                planned_sets: planned.map(|e| e.sets).unwrap_or_default(),
                exercise_id,
                actual_sets,
            };
            let performance = orchestrator.record_exercise(record).await?;
            print_json(&performance)
        }
        Command::CompleteWeek { week } => {
            let changed = orchestrator.complete_week(week).await?;
            print_json(&json!({
                "weekNumber": week,
                "changed": changed,
                "isCompleted": orchestrator.is_week_completed(week).await,
            }))
        }
        Command::Volume { week, muscle_group } => {
            let mut report = json!({
                "weekNumber": week,
                "totalVolume": orchestrator.weekly_volume(week).await,
                "isCompleted": orchestrator.is_week_completed(week).await,
            });
            if let Some(group) = muscle_group {
                report["muscleGroup"] = json!(group);
                report["muscleGroupVolume"] =
                    json!(orchestrator.muscle_group_volume(week, &group).await);
            }
            print_json(&report)
        }
        Command::Watch { seconds } => watch(&orchestrator, seconds).await,
    };

    orchestrator.dispose();
    result
}

async fn watch<R: RemoteStore>(
    orchestrator: &SyncOrchestrator<R, Cache>,
    seconds: Option<u64>,
) -> SyncResult<()> {
    let mut events = orchestrator.subscribe_events();
    let deadline = async {
        match seconds {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "Could not listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            }
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => return Ok(()),
            event = events.recv() => match event {
                Ok(event) => {
                    let line = serde_json::to_string(&event).map_err(|e| {
                        SyncError::serialization(format!("Failed to encode event: {e}"))
                    })?;
                    println!("{line}");
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event stream lagged"),
                Err(RecvError::Closed) => return Ok(()),
            },
        }
    }
}

/// Parse `id:reps:weight[:done]`
fn parse_set(spec: &str) -> SyncResult<ActualSet> {
    let parts: Vec<&str> = spec.split(':').collect();
    let invalid = || {
        SyncError::validation(
            "set",
            format!("'{spec}' is not id:reps:weight[:done]"),
        )
    };
    let (id, reps, weight, done) = match parts.as_slice() {
        [id, reps, weight] => (*id, *reps, *weight, false),
        [id, reps, weight, flag] => (*id, *reps, *weight, matches!(*flag, "done" | "true" | "1")),
        _ => return Err(invalid()),
    };
    let reps: u32 = reps.trim().parse().map_err(|_| invalid())?;
    let weight: f64 = weight.trim().parse().map_err(|_| invalid())?;
    Ok(if done {
        ActualSet::completed(id, reps, weight)
    } else {
        ActualSet::incomplete(id, reps, weight)
    })
}

/// Two-day, four-week program used by `--demo`
pub(crate) fn demo_assignment(client_id: Uuid) -> WorkoutAssignment {
    let exercise = |id: &str, name: &str, group: &str, reps: u32, weight: f64| WorkoutExercise {
        id: id.to_owned(),
        name: name.to_owned(),
        muscle_group: group.to_owned(),
        sets: vec![PlannedSet::new(reps, weight); 3],
        notes: None,
    };
    let program = vec![
        WorkoutDay {
            day_number: 1,
            name: Some("Push".to_owned()),
            exercises: vec![
                exercise("bench", "Bench Press", "chest", 8, 60.0),
                exercise("ohp", "Overhead Press", "shoulders", 8, 40.0),
            ],
        },
        WorkoutDay {
            day_number: 2,
            name: Some("Legs".to_owned()),
            exercises: vec![
                exercise("squat", "Back Squat", "legs", 5, 100.0),
                exercise("rdl", "Romanian Deadlift", "hamstrings", 8, 80.0),
            ],
        },
    ];
    WorkoutAssignment::new(client_id, program, 4)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set() {
        let done = parse_set("s1:8:60:done").unwrap();
        assert!(done.completed);
        assert!((done.volume() - 480.0).abs() < f64::EPSILON);

        let open = parse_set("s2:8:25").unwrap();
        assert!(!open.completed);
        assert!(parse_set("s3:eight:60").is_err());
        assert!(parse_set("s3").is_err());
    }
}
