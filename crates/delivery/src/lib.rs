//! # Delivery
//!
//! Batch serialization and the pluggable sinks.
//!
//! Responsibilities:
//! - Serialize finished batches into size-bounded request bodies
//! - Remote delivery with bounded retry/backoff
//! - Local capture of request bodies for offline inspection
//! - Validation-only handling for dry runs

pub mod numeric;
pub mod serializer;
pub mod sinks;

pub use numeric::float_to_decimal;
pub use serializer::serialize;
pub use sinks::{
    FileSink, RemoteSink, RemoteSinkConfig, TargetSink, ValidatingSink, MAX_DELIVERY_ATTEMPTS,
};
