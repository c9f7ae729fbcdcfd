// ABOUTME: Tracks the versions this actor committed so its own writes are not re-applied on echo
// ABOUTME: Shared by push delivery and poll ticks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::models::{Actor, WorkoutAssignment};
use std::sync::atomic::{AtomicU64, Ordering};

/// Self-echo detector for one actor
///
/// A remote document is an echo when it carries this actor's tag and the
/// exact version this actor last committed. Version 0 is never committed,
/// so it doubles as "nothing written yet".
#[derive(Debug)]
pub struct EchoGuard {
    actor: Actor,
    last_own_version: AtomicU64,
}

impl EchoGuard {
    /// Guard for `actor` with no writes recorded
    #[must_use]
    pub const fn new(actor: Actor) -> Self {
        Self {
            actor,
            last_own_version: AtomicU64::new(0),
        }
    }

    /// Actor this guard speaks for
    #[must_use]
    pub const fn actor(&self) -> Actor {
        self.actor
    }

    /// Remember a version this actor committed
    pub fn record_own_write(&self, version: u64) {
        self.last_own_version.fetch_max(version, Ordering::AcqRel);
    }

    /// Last version this actor committed, if any
    #[must_use]
    pub fn last_own_version(&self) -> Option<u64> {
        match self.last_own_version.load(Ordering::Acquire) {
            0 => None,
            v => Some(v),
        }
    }

    /// Whether `version` / `author` identify this actor's own last write
    #[must_use]
    pub fn is_echo_of(&self, version: u64, author: Actor) -> bool {
        author == self.actor && self.last_own_version() == Some(version)
    }

    /// Whether a remote document is this actor's own last write
    #[must_use]
    pub fn is_echo(&self, document: &WorkoutAssignment) -> bool {
        self.is_echo_of(document.version, document.last_modified_by)
    }
}
