//! Line parsing - raw input lines into typed messages

use contracts::Message;

/// Parse one raw input line into a typed message.
///
/// # Errors
/// Returns the underlying JSON error for anything that is not a well-formed
/// message line: invalid JSON, unknown `type` tag, missing required fields
/// (a SCHEMA without `key_properties` is malformed).
pub fn parse_line(line: &str) -> Result<Message, serde_json::Error> {
    serde_json::from_str(line)
}
