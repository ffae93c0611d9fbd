//! FileSink - writes request bodies to a local append target

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, instrument};

use contracts::{Batch, BatchSink, ContractError};
use observability::TimingsHandle;

use crate::serializer::serialize;

/// Sink that saves each request body as one line to a local file.
///
/// Runs the same serialization path as the remote sink, so the output file is
/// a byte-identical record of what would have been sent.
pub struct FileSink {
    name: String,
    path: PathBuf,
    output: BufWriter<File>,
    max_batch_bytes: usize,
    timings: TimingsHandle,
}

impl FileSink {
    /// Create a new FileSink writing to the given path
    pub fn new(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        max_batch_bytes: usize,
        timings: TimingsHandle,
    ) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let output = BufWriter::new(File::create(&path)?);

        Ok(Self {
            name: name.into(),
            path,
            output,
            max_batch_bytes,
            timings,
        })
    }

    fn write_bodies(&mut self, bodies: &[bytes::Bytes]) -> std::io::Result<()> {
        for (i, body) in bodies.iter().enumerate() {
            debug!(request = i + 1, bytes = body.len(), "Saving request body");
            self.output.write_all(body)?;
            self.output.write_all(b"\n")?;
        }
        self.output.flush()
    }
}

impl BatchSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_handle_batch",
        skip(self, batch),
        fields(sink = %self.name, table = batch.stream, messages = batch.messages.len())
    )]
    async fn handle_batch(&mut self, batch: Batch<'_>) -> Result<(), ContractError> {
        info!(
            sink = %self.name,
            messages = batch.messages.len(),
            table = batch.stream,
            path = %self.path.display(),
            "Saving batch"
        );

        let started = Instant::now();
        let bodies = serialize(
            batch.messages,
            batch.schema,
            batch.key_names,
            self.max_batch_bytes,
        )?;
        self.timings.add_serializing(started.elapsed());

        self.write_bodies(&bodies)
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }
}
