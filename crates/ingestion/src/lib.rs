//! # Ingestion
//!
//! Line-oriented input front end.
//!
//! Responsibilities:
//! - Read newline-delimited message lines from any buffered async input
//! - Parse lines into typed `Message` values
//! - Surface malformed lines as fatal errors (no partial-line recovery)
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::MessageReader;
//! use contracts::MessageSource;
//!
//! let stdin = tokio::io::BufReader::new(tokio::io::stdin());
//! let mut reader = MessageReader::new(stdin);
//! while let Some(parsed) = reader.next_message().await {
//!     // Hand to the engine
//! }
//! ```

mod parser;
mod reader;

pub use parser::parse_line;
pub use reader::MessageReader;
