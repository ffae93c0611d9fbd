//! MessageReader - async line reader over any buffered input

use contracts::{ContractError, MessageSource, ParsedMessage};
use metrics::counter;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::trace;

use crate::parser::parse_line;

/// Reads newline-delimited message lines from a buffered input and yields
/// typed messages together with their raw line lengths.
///
/// Whitespace-only lines are skipped; anything else that fails to parse is a
/// fatal error carrying the offending line number.
pub struct MessageReader<R> {
    lines: Lines<R>,
    line_no: u64,
}

impl<R: AsyncBufRead + Unpin + Send> MessageReader<R> {
    /// Create a reader over a buffered input
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    /// Number of lines consumed so far
    pub fn lines_read(&self) -> u64 {
        self.line_no
    }
}

impl<R: AsyncBufRead + Unpin + Send> MessageSource for MessageReader<R> {
    async fn next_message(&mut self) -> Option<Result<ParsedMessage, ContractError>> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    self.line_no += 1;
                    if line.trim().is_empty() {
                        continue;
                    }

                    let raw_bytes = line.len();
                    return Some(match parse_line(&line) {
                        Ok(message) => {
                            trace!(line = self.line_no, kind = message.kind(), "Parsed message");
                            counter!("stitch_target_messages_read_total",
                                     "kind" => message.kind())
                            .increment(1);
                            Ok(ParsedMessage { message, raw_bytes })
                        }
                        Err(e) => Err(ContractError::MessageParse {
                            message: format!("line {}: {e}", self.line_no),
                        }),
                    });
                }
                Ok(None) => return None,
                Err(e) => return Some(Err(ContractError::Io(e))),
            }
        }
    }
}
