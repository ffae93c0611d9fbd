//! `validate` command implementation.

use anyhow::{Context, Result};

use config_loader::ConfigLoader;

use crate::cli::ValidateArgs;

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    let config = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        // Never echo the credential back.
        let summary = serde_json::json!({
            "valid": true,
            "stitch_url": config.stitch_url,
            "disable_collection": config.disable_collection,
            "token": "<redacted>",
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Configuration OK");
        println!("  Endpoint: {}", config.stitch_url);
        println!(
            "  Anonymous usage reporting: {}",
            if config.disable_collection {
                "disabled"
            } else {
                "enabled"
            }
        );
    }

    Ok(())
}
