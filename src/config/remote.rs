// ABOUTME: Remote store connection configuration
// ABOUTME: Base URL plus request and connect timeouts for the HTTP remote
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::{env_config, sync};
use std::env;
use std::time::Duration;

/// Remote store configuration
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the authoritative store (no trailing slash)
    pub base_url: Option<String>,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            connect_timeout: Duration::from_secs(sync::DEFAULT_REMOTE_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl RemoteConfig {
    /// Load remote configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            base_url: env::var(env_config::REMOTE_URL)
                .ok()
                .map(|url| url.trim_end_matches('/').to_owned())
                .filter(|url| !url.is_empty()),
            ..Self::default()
        }
    }
}
