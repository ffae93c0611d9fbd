//! Buffer & flush engine - the pipeline orchestrator
//!
//! Owns the live buffer, per-stream metadata table, flush-trigger policy, and
//! checkpoint emission. Messages are handled strictly in arrival order and a
//! flush runs to completion (every sink, in configured order) before the next
//! message is handled.

use std::collections::HashMap;
use std::time::Instant;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument};

use contracts::{
    Batch, BatchLimits, BatchSink, ContractError, Message, MessageSource, ParsedMessage,
    StreamMeta,
};
use observability::TimingsHandle;

/// Counters from one engine run
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineStats {
    /// Total messages handled
    pub messages: u64,
    /// Record messages handled
    pub records: u64,
    /// Batches flushed to the sinks
    pub batches: u64,
    /// Checkpoint lines emitted
    pub checkpoints: u64,
}

/// The buffering, flush-triggering, and checkpoint-emission engine.
///
/// Invariant: the buffer is homogeneous in (stream, version) at all times;
/// any message that would violate this triggers a flush first. A checkpoint
/// is emitted only after the batch preceding it has been handed to every
/// sink, so a crash mid-delivery never advances the checkpoint past
/// undelivered data.
pub struct PipelineEngine<S, W> {
    sinks: Vec<S>,
    checkpoint_writer: W,
    limits: BatchLimits,
    timings: TimingsHandle,

    stream_meta: HashMap<String, StreamMeta>,
    buffer: Vec<Message>,
    buffer_bytes: usize,
    pending_checkpoint: Option<serde_json::Value>,
    time_last_flush: Instant,
    stats: EngineStats,
}

impl<S, W> PipelineEngine<S, W>
where
    S: BatchSink,
    W: AsyncWrite + Unpin + Send,
{
    /// Create an engine over an ordered sink list and a checkpoint writer
    pub fn new(sinks: Vec<S>, checkpoint_writer: W, limits: BatchLimits) -> Self {
        Self::with_timings(sinks, checkpoint_writer, limits, TimingsHandle::new())
    }

    /// Create an engine sharing an externally owned timings handle
    pub fn with_timings(
        sinks: Vec<S>,
        checkpoint_writer: W,
        limits: BatchLimits,
        timings: TimingsHandle,
    ) -> Self {
        Self {
            sinks,
            checkpoint_writer,
            limits,
            timings,
            stream_meta: HashMap::new(),
            buffer: Vec::new(),
            buffer_bytes: 0,
            pending_checkpoint: None,
            time_last_flush: Instant::now(),
            stats: EngineStats::default(),
        }
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Tear down into the sink list and checkpoint writer (for inspection)
    pub fn into_parts(self) -> (Vec<S>, W) {
        (self.sinks, self.checkpoint_writer)
    }

    /// Consume a message source to exhaustion, then perform a final flush.
    #[instrument(name = "engine_run", skip_all)]
    pub async fn run<M: MessageSource>(
        &mut self,
        source: &mut M,
    ) -> Result<EngineStats, ContractError> {
        while let Some(next) = source.next_message().await {
            self.handle_message(next?).await?;
        }
        self.flush().await?;

        info!(
            messages = self.stats.messages,
            records = self.stats.records,
            batches = self.stats.batches,
            checkpoints = self.stats.checkpoints,
            "Input exhausted"
        );
        Ok(self.stats)
    }

    /// Handle one parsed message, possibly flushing the buffer.
    pub async fn handle_message(&mut self, parsed: ParsedMessage) -> Result<(), ContractError> {
        self.stats.messages += 1;
        let ParsedMessage { message, raw_bytes } = parsed;

        match message {
            // A schema boundary always ends the current batch: mixing schemas
            // in one batch is unsafe.
            Message::Schema {
                stream,
                schema,
                key_properties,
            } => {
                self.flush().await?;
                self.stream_meta.insert(
                    stream,
                    StreamMeta {
                        schema,
                        key_properties,
                    },
                );
            }

            message @ (Message::Record { .. } | Message::ActivateVersion { .. }) => {
                let boundary = self.buffer.first().is_some_and(|head| {
                    head.stream() != message.stream() || head.version() != message.version()
                });
                if boundary {
                    self.flush().await?;
                }

                if matches!(message, Message::Record { .. }) {
                    self.stats.records += 1;
                }
                self.buffer.push(message);
                self.buffer_bytes += raw_bytes;
                observability::record_buffer_depth(self.buffer.len(), self.buffer_bytes);

                self.maybe_flush().await?;
            }

            // Later checkpoints replace earlier ones; only the most recent
            // survives to the next flush boundary.
            Message::State { value } => {
                self.pending_checkpoint = Some(value);
            }
        }

        Ok(())
    }

    /// Flush the buffer when any trigger fires. The three triggers are OR'd.
    async fn maybe_flush(&mut self) -> Result<(), ContractError> {
        let num_bytes = self.buffer_bytes;
        let num_messages = self.buffer.len();
        let num_seconds = self.time_last_flush.elapsed().as_secs_f64();

        let enough_bytes = num_bytes >= self.limits.max_batch_bytes;
        let enough_messages = num_messages >= self.limits.max_batch_records;
        let enough_time = num_seconds >= self.limits.batch_delay_seconds;

        if enough_bytes || enough_messages || enough_time {
            info!(
                bytes = num_bytes,
                messages = num_messages,
                seconds = format!("{num_seconds:.2}"),
                "Flushing batch"
            );
            self.flush().await?;
        }
        Ok(())
    }

    /// Deliver anything buffered, then emit any pending checkpoint.
    ///
    /// A sink error propagates before the checkpoint step runs; the pending
    /// checkpoint value stays put.
    pub async fn flush(&mut self) -> Result<(), ContractError> {
        if !self.buffer.is_empty() {
            let stream = match self.buffer[0].stream() {
                Some(stream) => stream,
                None => return Err(ContractError::other("buffered message without a stream")),
            };
            let meta = self
                .stream_meta
                .get(stream)
                .ok_or_else(|| ContractError::UnknownStream {
                    stream: stream.to_string(),
                })?;
            let batch = Batch {
                stream,
                messages: &self.buffer,
                schema: &meta.schema,
                key_names: &meta.key_properties,
            };

            for sink in &mut self.sinks {
                sink.handle_batch(batch).await?;
            }

            observability::record_batch_flushed(stream, self.buffer.len(), self.buffer_bytes);
            self.stats.batches += 1;
            // The time trigger measures from the previous flush's completion,
            // not from stream start.
            self.time_last_flush = Instant::now();
            self.buffer.clear();
            self.buffer_bytes = 0;
        }

        if let Some(state) = &self.pending_checkpoint {
            let line = serde_json::to_string(state)?;
            debug!(state = %line, "Emitting checkpoint");
            self.checkpoint_writer.write_all(line.as_bytes()).await?;
            self.checkpoint_writer.write_all(b"\n").await?;
            self.checkpoint_writer.flush().await?;
            self.pending_checkpoint = None;
            self.stats.checkpoints += 1;
            observability::record_checkpoint_emitted();
            self.timings.log_timings();
        }

        Ok(())
    }
}
