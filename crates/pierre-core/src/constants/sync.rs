// ABOUTME: Synchronization timing constants for polling, remote timeouts and event fan-out
// ABOUTME: Defaults used when the corresponding environment variables are not set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Fallback polling interval when no push channel is live
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Remote calls that take longer than this are treated as unreachable
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;

/// TCP connect timeout for the HTTP remote
pub const DEFAULT_REMOTE_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Capacity of the per-orchestrator sync event channel
pub const DEFAULT_EVENT_BUFFER: usize = 64;

/// Capacity of the per-subscription push delivery channel
pub const PUSH_CHANNEL_CAPACITY: usize = 32;

/// Version carried by an assignment that has never been written remotely
pub const INITIAL_VERSION: u64 = 0;

/// Week that is always reachable
pub const DEFAULT_UNLOCKED_WEEK: u32 = 1;
