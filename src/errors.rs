// ABOUTME: Re-exports the unified error types from pierre-core
// ABOUTME: Keeps `crate::errors::*` paths stable for engine modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use pierre_core::errors::*;
