// ABOUTME: Re-exports the workout assignment and performance models from pierre-core
// ABOUTME: Single import path for engine modules, tests and the CLI
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use pierre_core::models::*;
