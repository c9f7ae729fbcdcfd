// ABOUTME: pierre-sync - command-line driver for the coach/client assignment sync engine
// ABOUTME: Loads, edits and watches an assignment and records performance; prints JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Load the active assignment for a client
//! pierre-sync --client-id 6f1c... --remote-url https://api.example.com load
//!
//! # Change the weight of the second set of the bench press on day 1
//! pierre-sync --client-id 6f1c... edit-set --day-index 0 --exercise-id bench --set-index 1 --field weight --value 62.5
//!
//! # Unlock week 2 as the coach
//! pierre-sync --client-id 6f1c... --actor coach unlock-week --week 2
//!
//! # Record performed sets (id:reps:weight[:done]) and read the volume back
//! pierre-sync --client-id 6f1c... record --week 2 --day 1 --exercise-id bench --set s1:8:60:done
//! pierre-sync --client-id 6f1c... volume --week 2 --muscle-group chest
//!
//! # Try everything against an in-process store
//! pierre-sync --demo load
//! ```

mod commands;

use clap::{Parser, Subcommand};
use pierre_coach_sync::cache::factory::Cache;
use pierre_coach_sync::cache::CacheProvider;
use pierre_coach_sync::config::{CacheConfig, CoachSyncConfig};
use pierre_coach_sync::errors::{AppError, ErrorResponse, SyncError};
use pierre_coach_sync::logging::LoggingConfig;
use pierre_coach_sync::models::Actor;
use pierre_coach_sync::sync::{HttpRemoteStore, InMemoryRemoteStore};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "pierre-sync",
    about = "Pierre coach/client assignment sync",
    long_about = "Drive the assignment sync engine from the command line: load and edit a client's workout assignment, record performed sets and watch for remote changes."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Client whose assignment is synchronized (random in demo mode if omitted)
    #[arg(long, global = true)]
    client_id: Option<Uuid>,

    /// Actor edits are attributed to (coach or client)
    #[arg(long, global = true, default_value = "client")]
    actor: String,

    /// Remote store base URL override
    #[arg(long, global = true)]
    remote_url: Option<String>,

    /// SQLite cache URL override (e.g. sqlite:./data/coach_sync.db)
    #[arg(long, global = true)]
    cache_url: Option<String>,

    /// Use an in-process remote store seeded with a demo assignment
    #[arg(long, global = true)]
    demo: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Resolve and print the active assignment
    Load,

    /// Edit reps or weight of one planned set
    EditSet {
        /// 0-based day index
        #[arg(long)]
        day_index: usize,

        /// Exercise id within the day
        #[arg(long)]
        exercise_id: String,

        /// 0-based set index
        #[arg(long)]
        set_index: usize,

        /// Field to change: reps or weight
        #[arg(long)]
        field: String,

        /// New value
        #[arg(long)]
        value: f64,
    },

    /// Unlock (or lock) a program week; coach only
    UnlockWeek {
        /// Week number
        #[arg(long)]
        week: u32,

        /// Lock the week instead
        #[arg(long)]
        lock: bool,
    },

    /// Record performed sets for one exercise
    Record {
        /// Program week
        #[arg(long)]
        week: u32,

        /// Program day (1-based)
        #[arg(long)]
        day: u32,

        /// Exercise id
        #[arg(long)]
        exercise_id: String,

        /// Display name (defaults to the name in the assignment)
        #[arg(long)]
        exercise_name: Option<String>,

        /// Muscle group (defaults to the group in the assignment)
        #[arg(long)]
        muscle_group: Option<String>,

        /// Performed set as id:reps:weight[:done], repeatable
        #[arg(long = "set", required = true)]
        sets: Vec<String>,
    },

    /// Mark a week completed
    CompleteWeek {
        /// Week number
        #[arg(long)]
        week: u32,
    },

    /// Print training volume for a week
    Volume {
        /// Week number
        #[arg(long)]
        week: u32,

        /// Also report this muscle group
        #[arg(long)]
        muscle_group: Option<String>,
    },

    /// Print sync events as JSON lines
    Watch {
        /// Stop after this many seconds (runs until Ctrl-C if omitted)
        #[arg(long)]
        seconds: Option<u64>,
    },
}

fn init_logging(verbose: bool) {
    let mut logging = LoggingConfig::from_env();
    if verbose {
        "debug".clone_into(&mut logging.level);
    }
    if let Err(e) = logging.init() {
        eprintln!("Failed to initialize logging: {e}");
    }
}

fn report(error: &AppError) {
    match serde_json::to_string_pretty(&ErrorResponse::from(error)) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("{error}"),
    }
}

/// Exit code for a failed command: caller-actionable errors are distinct
fn exit_code_for(error: &SyncError) -> u8 {
    match error {
        SyncError::Conflict { .. } => 3,
        SyncError::Validation { .. } => 2,
        _ => 1,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&AppError::from(error.clone()));
            ExitCode::from(exit_code_for(&error))
        }
    }
}

async fn run(cli: Cli) -> Result<(), SyncError> {
    let mut config = CoachSyncConfig::from_env();
    if let Some(url) = cli.remote_url.clone() {
        config.remote.base_url = Some(url.trim_end_matches('/').to_owned());
    }
    if let Some(url) = cli.cache_url.clone() {
        config.cache = CacheConfig {
            database_url: Some(url),
            ..config.cache
        };
    }
    // one-shot commands drive the engine explicitly
    config.sync.enable_background_sync = matches!(cli.command, Command::Watch { .. });

    let actor = Actor::parse(&cli.actor);
    let cache = Cache::new(config.cache.clone()).await?;
    info!(backend = cache.backend_name(), actor = %actor, "pierre-sync starting");

    if cli.demo {
        let remote = Arc::new(InMemoryRemoteStore::new());
        let client_id = cli.client_id.unwrap_or_else(Uuid::new_v4);
        remote
            .insert_assignment(commands::demo_assignment(client_id))
            .await;
        return commands::execute(cli.command, client_id, actor, remote, cache, config.sync).await;
    }

    let client_id = cli
        .client_id
        .ok_or_else(|| SyncError::validation("clientId", "--client-id is required"))?;
    let remote = Arc::new(HttpRemoteStore::new(&config.remote, config.sync.remote_timeout)?);
    commands::execute(cli.command, client_id, actor, remote, cache, config.sync).await
}
