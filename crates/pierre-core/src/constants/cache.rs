// ABOUTME: Local document cache constants for capacity and key namespacing
// ABOUTME: Shared by the in-memory and SQLite cache backends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Default maximum cache entries for the in-memory cache
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 1_000;

/// Cache key prefix for namespacing
pub const CACHE_KEY_PREFIX: &str = "pierre:sync:";
