//! # stitch-target CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Configuration loading and validation
//! - Pipeline orchestration and lifecycle management
//! - Known/unexpected error reporting at exit

mod cli;
mod commands;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::Layer;

use cli::{Cli, Commands};
use commands::{run_pipeline, run_validate};
use contracts::ContractError;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on CLI options
    init_logging(&cli)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "stitch-target starting"
    );

    // Background memory reporter (best-effort, detached)
    let _memory_reporter = observability::spawn_memory_reporter();

    // Execute command
    let result = match &cli.command {
        Commands::Run(args) => run_pipeline(args).await,
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(err) = result {
        // Known failure modes get a one-line critical summary without a
        // diagnostic trace; everything else keeps its full detail.
        match err.downcast_ref::<ContractError>() {
            Some(known) if known.is_expected() => {
                error!(error = %known, "Fatal");
                std::process::exit(1);
            }
            _ => {
                error!(error = ?err, "Command failed");
                return Err(err);
            }
        }
    }

    Ok(())
}

/// Initialize logging based on CLI options.
///
/// All log output goes to stderr: stdout is reserved for the checkpoint
/// stream.
fn init_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else {
        let default_level = match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    let fmt_layer = match cli.log_format {
        cli::LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        cli::LogFormat::Pretty => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        cli::LogFormat::Compact => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
