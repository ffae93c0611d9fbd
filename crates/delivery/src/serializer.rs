//! Batch serializer - builds request bodies, splitting recursively when oversized

use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use contracts::{ContractError, Message};

/// One request body for the batch-ingestion endpoint
#[derive(Serialize)]
struct RequestBody<'a> {
    table_name: &'a str,
    schema: &'a Value,
    key_names: &'a [String],
    messages: Vec<BodyEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    table_version: Option<i64>,
}

/// One entry in a request body's message list
#[derive(Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum BodyEntry {
    Upsert {
        data: Value,
        vintage: String,
        sequence: i64,
    },
    ActivateVersion {
        sequence: i64,
    },
}

/// Serialize an ordered list of same-stream/version messages into one or
/// more size-bounded request bodies.
///
/// If the whole list fits under `max_bytes` one body is produced; otherwise
/// the list is split at its midpoint and both halves are serialized
/// recursively, so the concatenation of all bodies' message lists equals the
/// input list in order. A single message that cannot fit is a dedicated
/// fatal error, never retried.
pub fn serialize(
    messages: &[Message],
    schema: &Value,
    key_names: &[String],
    max_bytes: usize,
) -> Result<Vec<Bytes>, ContractError> {
    let Some(first) = messages.first() else {
        return Ok(Vec::new());
    };
    let table_name = match first.stream() {
        Some(stream) => stream,
        None => return Err(ContractError::other("serializer given a stream-less message")),
    };

    let entries: Vec<BodyEntry> = messages
        .iter()
        .filter_map(|message| match message {
            Message::Record { record, .. } => Some(BodyEntry::Upsert {
                data: record.clone(),
                vintage: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
                sequence: Utc::now().timestamp_millis(),
            }),
            Message::ActivateVersion { .. } => Some(BodyEntry::ActivateVersion {
                sequence: Utc::now().timestamp_millis(),
            }),
            _ => None,
        })
        .collect();

    let body = RequestBody {
        table_name,
        schema,
        key_names,
        messages: entries,
        table_version: first.version(),
    };

    let serialized = serde_json::to_vec(&body)?;
    debug!(
        messages = messages.len(),
        bytes = serialized.len(),
        "Serialized batch"
    );

    if serialized.len() < max_bytes {
        return Ok(vec![Bytes::from(serialized)]);
    }

    if messages.len() <= 1 {
        return Err(ContractError::BatchTooLarge { limit: max_bytes });
    }

    let pivot = messages.len() / 2;
    let mut bodies = serialize(&messages[..pivot], schema, key_names, max_bytes)?;
    bodies.extend(serialize(&messages[pivot..], schema, key_names, max_bytes)?);
    Ok(bodies)
}
