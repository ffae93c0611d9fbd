//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// stitch-target - streaming batch-delivery pipeline for the Stitch import API
#[derive(Parser, Debug)]
#[command(
    name = "stitch-target",
    author,
    version,
    about = "Streaming batch-delivery target for the Stitch import API",
    long_about = "Reads newline-delimited change-event messages on stdin, groups them \n\
                  into size- and time-bounded batches per table, delivers each batch \n\
                  to the configured sinks, and emits checkpoint markers on stdout \n\
                  once the preceding batch is fully delivered."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "STITCH_TARGET_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "STITCH_TARGET_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the delivery pipeline over stdin
    Run(RunArgs),

    /// Validate a configuration file without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to the delivery configuration file (JSON or TOML)
    #[arg(short, long, env = "STITCH_TARGET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Dry run - validate records against their schema instead of delivering
    #[arg(short = 'n', long, env = "STITCH_TARGET_DRY_RUN")]
    pub dry_run: bool,

    /// Save request bodies to this file
    #[arg(short, long, env = "STITCH_TARGET_OUTPUT_FILE")]
    pub output_file: Option<PathBuf>,

    /// Maximum buffered records per batch
    #[arg(long, default_value = "20000", env = "STITCH_TARGET_MAX_BATCH_RECORDS")]
    pub max_batch_records: usize,

    /// Maximum serialized bytes per request body
    #[arg(long, default_value = "4000000", env = "STITCH_TARGET_MAX_BATCH_BYTES")]
    pub max_batch_bytes: usize,

    /// Minimum seconds between batch flushes
    #[arg(long, default_value = "300", env = "STITCH_TARGET_BATCH_DELAY_SECONDS")]
    pub batch_delay_seconds: f64,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "STITCH_TARGET_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}
