//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse JSON/TOML configuration files
//! - Validate configuration legality
//! - Rewrite the historical push endpoint to the batch endpoint
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("config.json")).unwrap();
//! println!("Endpoint: {}", config.stitch_url);
//! ```

mod parser;
mod validator;

pub use contracts::TargetConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;
use tracing::info;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.json / .toml).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<TargetConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<TargetConfig, ContractError> {
        let mut config = parser::parse(content, format)?;
        config.stitch_url = normalize_batch_url(config.stitch_url);
        validator::validate(&config)?;
        Ok(config)
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Replace the historical `/import/push` path with `/import/batch`.
///
/// The push endpoint no longer accepts batch bodies; configs still pointing
/// at it are rewritten before use.
pub fn normalize_batch_url(url: String) -> String {
    match url.strip_suffix("/import/push") {
        Some(base) => {
            let rewritten = format!("{base}/import/batch");
            info!(from = %url, to = %rewritten, "Rewrote push endpoint to batch endpoint");
            rewritten
        }
        None => url,
    }
}
