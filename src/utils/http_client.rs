// ABOUTME: Shared HTTP client construction for the remote store
// ABOUTME: Separate clients for bounded request/response calls and long-lived event streams
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Create a client for request/response calls with an overall timeout
///
/// # Arguments
/// * `timeout` - Request timeout
/// * `connect_timeout` - Connection timeout
///
/// Falls back to a default client if custom client creation fails
#[must_use]
pub fn create_client_with_timeout(timeout: Duration, connect_timeout: Duration) -> Client {
    ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Create a client for Server-Sent Events streams
///
/// Only the connect phase is bounded; the response body stays open for as
/// long as the server keeps pushing.
#[must_use]
pub fn create_streaming_client(connect_timeout: Duration) -> Client {
    ClientBuilder::new()
        .connect_timeout(connect_timeout)
        .tcp_keepalive(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
}
