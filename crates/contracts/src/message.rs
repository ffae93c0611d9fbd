//! Input message model
//!
//! Typed variants of the line-delimited change-event protocol. Pure data,
//! produced by the ingestion front end and consumed by the engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single parsed input message.
///
/// Closed tagged union; the engine matches exhaustively, so adding a message
/// kind is a compile-time-checked change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Schema declaration for a stream
    Schema {
        stream: String,
        schema: Value,
        key_properties: Vec<String>,
    },

    /// Row upsert
    Record {
        stream: String,
        record: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<i64>,
    },

    /// Table version switch
    ActivateVersion { stream: String, version: i64 },

    /// Checkpoint marker
    State { value: Value },
}

impl Message {
    /// Stream name, if this message kind belongs to one
    pub fn stream(&self) -> Option<&str> {
        match self {
            Self::Schema { stream, .. }
            | Self::Record { stream, .. }
            | Self::ActivateVersion { stream, .. } => Some(stream),
            Self::State { .. } => None,
        }
    }

    /// Table version carried by bufferable message kinds.
    ///
    /// An absent version is a distinct value from any integer; two records
    /// with `None` and `Some(1)` never share a batch.
    pub fn version(&self) -> Option<i64> {
        match self {
            Self::Record { version, .. } => *version,
            Self::ActivateVersion { version, .. } => Some(*version),
            _ => None,
        }
    }

    /// Wire-level type tag (for logging/metrics labels)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Schema { .. } => "SCHEMA",
            Self::Record { .. } => "RECORD",
            Self::ActivateVersion { .. } => "ACTIVATE_VERSION",
            Self::State { .. } => "STATE",
        }
    }
}

/// Schema and key properties remembered per stream.
///
/// Created/overwritten whenever a schema message for the stream arrives;
/// never deleted during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamMeta {
    pub schema: Value,
    pub key_properties: Vec<String>,
}

/// A parsed message together with the byte length of the raw input line it
/// came from (feeds the engine's byte-based flush trigger).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMessage {
    pub message: Message,
    pub raw_bytes: usize,
}

/// Borrowed view of one finished batch, handed to every configured sink.
///
/// All messages belong to one stream and share one version value.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    pub stream: &'a str,
    pub messages: &'a [Message],
    pub schema: &'a Value,
    pub key_names: &'a [String],
}

impl Batch<'_> {
    /// Version shared by every message in the batch
    pub fn version(&self) -> Option<i64> {
        self.messages.first().and_then(Message::version)
    }
}
