//! Layered error definitions
//!
//! Categorized by source: config / input / batch / validation / delivery

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Input Errors =====
    /// Malformed input line (fatal, no partial-line recovery)
    #[error("message parse error: {message}")]
    MessageParse { message: String },

    // ===== Batch Errors =====
    /// A single message is larger than the request size limit
    #[error("a single message is larger than the batch size limit of {limit} bytes")]
    BatchTooLarge { limit: usize },

    /// A record arrived for a stream with no preceding schema
    #[error("no schema seen for stream '{stream}'")]
    UnknownStream { stream: String },

    // ===== Validation Errors =====
    /// Record failed schema validation
    #[error("record validation failed for stream '{stream}': {message}")]
    SchemaValidation { stream: String, message: String },

    /// Record is missing a declared key property
    #[error("message {index} is missing key property '{property}'")]
    MissingKeyProperty { index: usize, property: String },

    // ===== Delivery Errors =====
    /// The remote side rejected a request body
    #[error("error sending data to Stitch: {message}")]
    Delivery { message: String },

    /// Could not reach the remote side within the retry ceiling
    #[error("error connecting to Stitch: {message}")]
    Connection { message: String },

    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// Serialization error
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create schema validation error
    pub fn schema_validation(stream: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaValidation {
            stream: stream.into(),
            message: message.into(),
        }
    }

    /// Create delivery rejection error
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }

    /// Create connectivity error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Whether this error is an expected failure mode, reported as a one-line
    /// summary without a diagnostic trace.
    ///
    /// Malformed input, IO failures, and uncategorized errors keep their full
    /// diagnostics.
    pub fn is_expected(&self) -> bool {
        !matches!(
            self,
            Self::MessageParse { .. } | Self::Json(_) | Self::Io(_) | Self::Other(_)
        )
    }
}
