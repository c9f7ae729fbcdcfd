// ABOUTME: HTTP backend for the remote assignment store using reqwest and Server-Sent Events
// ABOUTME: Conditional PUT with expectedVersion; 409 carries the current document
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::sse::SseLineBuffer;
use super::{RemoteStore, RemoteWrite};
use crate::config::RemoteConfig;
use crate::constants::sync::PUSH_CHANNEL_CAPACITY;
use crate::errors::{AppError, AppResult};
use crate::models::{Actor, WorkoutAssignment};
use crate::utils::http_client::{create_client_with_timeout, create_streaming_client};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

const SERVICE: &str = "assignment-store";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WriteRequest<'a> {
    document: &'a WorkoutAssignment,
    expected_version: u64,
    actor: Actor,
}

#[derive(Deserialize)]
struct CommittedResponse {
    version: u64,
}

#[derive(Deserialize)]
struct ConflictResponse {
    document: WorkoutAssignment,
}

/// Remote store reached over HTTP
pub struct HttpRemoteStore {
    base_url: String,
    client: Client,
    stream_client: Client,
}

impl HttpRemoteStore {
    /// Build from configuration
    ///
    /// # Errors
    ///
    /// Returns a config error if no base URL is configured
    pub fn new(config: &RemoteConfig, request_timeout: Duration) -> AppResult<Self> {
        let base_url = config
            .base_url
            .clone()
            .ok_or_else(|| AppError::config("remote store URL is not configured"))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client: create_client_with_timeout(request_timeout, config.connect_timeout),
            stream_client: create_streaming_client(config.connect_timeout),
        })
    }

    fn transport_error(e: &reqwest::Error) -> AppError {
        AppError::remote_unreachable(format!("HTTP request failed: {e}"))
    }

    async fn status_error(response: Response) -> AppError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_owned());
        if status.is_server_error() {
            AppError::remote_unreachable(format!("{SERVICE} returned {status}: {body}"))
        } else {
            AppError::external_service(SERVICE, format!("{status}: {body}"))
        }
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    #[instrument(skip(self))]
    async fn fetch_assignment(&self, client_id: Uuid) -> AppResult<Option<WorkoutAssignment>> {
        let url = format!("{}/clients/{client_id}/workout-assignment", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json()
                .await
                .map(Some)
                .map_err(|e| AppError::serialization(format!("Invalid assignment payload: {e}"))),
            _ => Err(Self::status_error(response).await),
        }
    }

    #[instrument(skip(self, document))]
    async fn write_assignment(
        &self,
        assignment_id: Uuid,
        document: &WorkoutAssignment,
        expected_version: u64,
        actor: Actor,
    ) -> AppResult<RemoteWrite> {
        let url = format!("{}/workout-assignments/{assignment_id}", self.base_url);
        let response = self
            .client
            .put(&url)
            .json(&WriteRequest {
                document,
                expected_version,
                actor,
            })
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        match response.status() {
            StatusCode::CONFLICT => {
                let body: ConflictResponse = response.json().await.map_err(|e| {
                    AppError::serialization(format!("Invalid conflict payload: {e}"))
                })?;
                Ok(RemoteWrite::Conflict {
                    current: Box::new(body.document),
                })
            }
            StatusCode::NOT_FOUND => Err(AppError::not_found(format!(
                "assignment {assignment_id}"
            ))),
            status if status.is_success() => {
                let body: CommittedResponse = response.json().await.map_err(|e| {
                    AppError::serialization(format!("Invalid commit payload: {e}"))
                })?;
                Ok(RemoteWrite::Committed {
                    version: body.version,
                })
            }
            _ => Err(Self::status_error(response).await),
        }
    }

    #[instrument(skip(self))]
    async fn subscribe(
        &self,
        assignment_id: Uuid,
    ) -> AppResult<Option<mpsc::Receiver<WorkoutAssignment>>> {
        let url = format!("{}/workout-assignments/{assignment_id}/events", self.base_url);
        let response = self
            .stream_client
            .get(&url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::NOT_IMPLEMENTED => return Ok(None),
            status if !status.is_success() => return Err(Self::status_error(response).await),
            _ => {}
        }

        let (tx, rx) = mpsc::channel(PUSH_CHANNEL_CAPACITY);
        let mut byte_stream = response.bytes_stream();

        tokio::spawn(async move {
            let mut parser = SseLineBuffer::new();
            'stream: loop {
                let (messages, finished) = tokio::select! {
                    () = tx.closed() => break,
                    chunk = byte_stream.next() => match chunk {
                        Some(Ok(bytes)) => (parser.feed(&bytes), false),
                        Some(Err(e)) => {
                            warn!(assignment_id = %assignment_id, error = %e, "Assignment event stream failed");
                            break;
                        }
                        None => (parser.flush(), true),
                    },
                };

                for message in messages {
                    match serde_json::from_str::<WorkoutAssignment>(&message.data) {
                        Ok(document) => {
                            if tx.send(document).await.is_err() {
                                break 'stream;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "Skipping malformed assignment event");
                        }
                    }
                }
                if finished {
                    break;
                }
            }
            debug!(assignment_id = %assignment_id, "Assignment event stream closed");
        });

        Ok(Some(rx))
    }
}
