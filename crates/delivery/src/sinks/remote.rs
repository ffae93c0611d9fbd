//! RemoteSink - HTTPS delivery with bounded exponential-backoff retry

use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::{header, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use contracts::{Batch, BatchSink, ContractError};
use observability::{record_request_posted, TimingsHandle};

use crate::serializer::serialize;

/// Delivery attempt ceiling; retries use doubling backoff between attempts
pub const MAX_DELIVERY_ATTEMPTS: u32 = 8;

/// Initial backoff delay
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Configuration for RemoteSink
#[derive(Debug, Clone)]
pub struct RemoteSinkConfig {
    /// Batch-ingestion endpoint URL
    pub endpoint: String,
    /// Bearer credential
    pub token: String,
    /// Maximum serialized bytes per request body
    pub max_batch_bytes: usize,
}

/// Sink that posts request bodies to the delivery endpoint.
///
/// Bodies are sent strictly in serializer order; a batch is finished only
/// when every body has been accepted or an error has propagated.
pub struct RemoteSink {
    name: String,
    client: reqwest::Client,
    config: RemoteSinkConfig,
    timings: TimingsHandle,
}

/// Outcome of one failed delivery attempt
#[derive(Debug, Error)]
enum AttemptError {
    /// Got an HTTP response carrying a non-success status
    #[error("delivery rejected ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    /// No usable response at all
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl RemoteSink {
    /// Create a new RemoteSink
    pub fn new(
        name: impl Into<String>,
        config: RemoteSinkConfig,
        timings: TimingsHandle,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ContractError::sink_write(&name, e.to_string()))?;

        debug!(sink = %name, endpoint = %config.endpoint, "RemoteSink ready");

        Ok(Self {
            name,
            client,
            config,
            timings,
        })
    }

    /// Post one body, retrying transient failures with doubling backoff.
    ///
    /// Client-error responses (4xx) are never retried.
    async fn send_with_retry(&self, body: Bytes) -> Result<(), ContractError> {
        let mut delay = INITIAL_BACKOFF;

        for attempt in 1..=MAX_DELIVERY_ATTEMPTS {
            match self.post(body.clone()).await {
                Ok(()) => {
                    record_request_posted(&self.name, true);
                    return Ok(());
                }
                Err(AttemptError::Rejected { status, message }) if status.is_client_error() => {
                    record_request_posted(&self.name, false);
                    return Err(ContractError::delivery(message));
                }
                Err(err) if attempt == MAX_DELIVERY_ATTEMPTS => {
                    record_request_posted(&self.name, false);
                    return Err(match err {
                        AttemptError::Rejected { message, .. } => ContractError::delivery(message),
                        AttemptError::Transport(e) => {
                            error!(sink = %self.name, error = %e, "Transport failure, retries exhausted");
                            ContractError::connection(format!(
                                "giving up after {MAX_DELIVERY_ATTEMPTS} attempts"
                            ))
                        }
                    });
                }
                Err(err) => {
                    info!(
                        sink = %self.name,
                        attempt,
                        wait_secs = delay.as_secs(),
                        error = %err,
                        "Error sending data, sleeping before trying again"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }

        // The loop always returns on the final attempt.
        Err(ContractError::connection(format!(
            "giving up after {MAX_DELIVERY_ATTEMPTS} attempts"
        )))
    }

    /// One delivery attempt
    async fn post(&self, body: Bytes) -> Result<(), AttemptError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        Err(AttemptError::Rejected {
            status,
            message: decode_rejection(status, &text),
        })
    }
}

/// Extract the human-readable `message` field from a rejection body, falling
/// back to a raw status/body summary when decoding fails.
fn decode_rejection(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("{status}: {body}"))
}

impl BatchSink for RemoteSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "remote_sink_handle_batch",
        skip(self, batch),
        fields(sink = %self.name, table = batch.stream, messages = batch.messages.len())
    )]
    async fn handle_batch(&mut self, batch: Batch<'_>) -> Result<(), ContractError> {
        info!(
            sink = %self.name,
            messages = batch.messages.len(),
            table = batch.stream,
            endpoint = %self.config.endpoint,
            "Sending batch"
        );

        let started = Instant::now();
        let bodies = serialize(
            batch.messages,
            batch.schema,
            batch.key_names,
            self.config.max_batch_bytes,
        )?;
        self.timings.add_serializing(started.elapsed());

        info!(requests = bodies.len(), "Split batch into requests");
        for (i, body) in bodies.iter().enumerate() {
            debug!(
                request = i + 1,
                of = bodies.len(),
                bytes = body.len(),
                "Posting request body"
            );
            let started = Instant::now();
            let result = self.send_with_retry(body.clone()).await;
            self.timings.add_delivering(started.elapsed());
            result?;
        }
        Ok(())
    }
}
