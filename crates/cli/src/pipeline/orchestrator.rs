//! Pipeline orchestrator - coordinates all components.
//!
//! Wires config -> sinks -> engine, spawns the best-effort background
//! side-cars, and runs the engine over stdin to exhaustion.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::info;

use contracts::{BatchLimits, TargetConfig};
use delivery::{FileSink, RemoteSink, RemoteSinkConfig, TargetSink, ValidatingSink};
use engine::PipelineEngine;
use ingestion::MessageReader;
use observability::TimingsHandle;

use super::RunStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Delivery configuration (absent in dry-run mode)
    pub target: Option<TargetConfig>,

    /// Validate records instead of delivering them
    pub dry_run: bool,

    /// Save request bodies to this file
    pub output_file: Option<PathBuf>,

    /// Flush-trigger limits
    pub limits: BatchLimits,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<RunStats> {
        let start_time = Instant::now();

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let timings = TimingsHandle::new();
        let sinks = self.build_sinks(&timings)?;
        let active_sinks = sinks.len();

        info!(active_sinks, "Pipeline configured, reading from stdin");

        let stdin = BufReader::new(tokio::io::stdin());
        let mut source = MessageReader::new(stdin);
        let mut engine = PipelineEngine::with_timings(
            sinks,
            tokio::io::stdout(),
            self.config.limits,
            timings,
        );

        let stats = engine.run(&mut source).await?;

        Ok(RunStats {
            engine: stats,
            active_sinks,
            duration: start_time.elapsed(),
        })
    }

    /// Build the ordered sink list from the run configuration.
    ///
    /// The local-file sink, when configured, runs before the delivery or
    /// validation sink so its capture is complete even if delivery fails.
    fn build_sinks(&self, timings: &TimingsHandle) -> Result<Vec<TargetSink>> {
        let mut sinks = Vec::new();

        if let Some(path) = &self.config.output_file {
            let sink = FileSink::new(
                "output-file",
                path,
                self.config.limits.max_batch_bytes,
                timings.clone(),
            )
            .with_context(|| format!("Failed to open output file {}", path.display()))?;
            info!(path = %path.display(), "Saving request bodies to local file");
            sinks.push(TargetSink::LocalFile(sink));
        }

        if self.config.dry_run {
            info!("Dry run mode - validating records instead of delivering them");
            sinks.push(TargetSink::Validating(ValidatingSink::new("validator")));
        } else if let Some(target) = &self.config.target {
            if !target.disable_collection {
                info!(
                    "Sending anonymous usage data; set \"disable_collection\" \
                     to true in the config to opt out"
                );
                let _ = tokio::spawn(observability::report_usage(env!("CARGO_PKG_VERSION")));
            }

            let sink = RemoteSink::new(
                "stitch",
                RemoteSinkConfig {
                    endpoint: target.stitch_url.clone(),
                    token: target.token.clone(),
                    max_batch_bytes: self.config.limits.max_batch_bytes,
                },
                timings.clone(),
            )?;
            info!(endpoint = %target.stitch_url, "Delivering batches to remote endpoint");
            sinks.push(TargetSink::Remote(sink));
        }

        Ok(sinks)
    }
}
