//! Delivery configuration types
//!
//! Owned by the CLI/config layer, consumed as engine constructor parameters.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default delivery endpoint
pub const DEFAULT_STITCH_URL: &str = "https://api.stitchdata.com/v2/import/batch";

/// Default maximum serialized bytes per request body
pub const DEFAULT_MAX_BATCH_BYTES: usize = 4_000_000;

/// Default maximum buffered records per batch
pub const DEFAULT_MAX_BATCH_RECORDS: usize = 20_000;

/// Default minimum flush interval in seconds
pub const DEFAULT_BATCH_DELAY_SECONDS: f64 = 300.0;

/// Delivery configuration loaded from the config file
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TargetConfig {
    /// Bearer credential for the delivery endpoint
    #[validate(length(min = 1, message = "token must not be empty"))]
    pub token: String,

    /// Delivery endpoint URL
    #[serde(default = "default_stitch_url")]
    pub stitch_url: String,

    /// Opt out of the anonymous usage notification
    #[serde(default)]
    pub disable_collection: bool,
}

fn default_stitch_url() -> String {
    DEFAULT_STITCH_URL.to_string()
}

/// Flush-trigger limits for the buffer engine.
///
/// The three triggers are OR'd; any one is sufficient to flush.
#[derive(Debug, Clone, Copy)]
pub struct BatchLimits {
    /// Flush when the buffered raw-line bytes reach this
    pub max_batch_bytes: usize,
    /// Flush when the buffered message count reaches this
    pub max_batch_records: usize,
    /// Flush when this many seconds have passed since the last flush completed
    pub batch_delay_seconds: f64,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_batch_bytes: DEFAULT_MAX_BATCH_BYTES,
            max_batch_records: DEFAULT_MAX_BATCH_RECORDS,
            batch_delay_seconds: DEFAULT_BATCH_DELAY_SECONDS,
        }
    }
}
