//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use config_loader::ConfigLoader;
use contracts::BatchLimits;

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    // Delivery config is required unless we only validate; dry-run mode
    // ignores a config even when one is given.
    let target = if args.dry_run {
        None
    } else {
        let Some(path) = &args.config else {
            anyhow::bail!("config file required when not in dry-run mode");
        };
        if !path.exists() {
            anyhow::bail!("Configuration file not found: {}", path.display());
        }
        info!(config = %path.display(), "Loading configuration");
        let config = ConfigLoader::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        Some(config)
    };

    let pipeline_config = PipelineConfig {
        target,
        dry_run: args.dry_run,
        output_file: args.output_file.clone(),
        limits: BatchLimits {
            max_batch_bytes: args.max_batch_bytes,
            max_batch_records: args.max_batch_records,
            batch_delay_seconds: args.batch_delay_seconds,
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    let stats = Pipeline::new(pipeline_config).run().await?;

    info!(
        records = stats.engine.records,
        batches = stats.engine.batches,
        checkpoints = stats.engine.checkpoints,
        duration_secs = stats.duration.as_secs_f64(),
        "Pipeline completed successfully"
    );
    stats.print_summary();

    info!("Exiting normally");
    Ok(())
}
