// ABOUTME: Re-exports the domain constants from pierre-core
// ABOUTME: Timing, capacity and environment variable names used by the engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use pierre_core::constants::*;
