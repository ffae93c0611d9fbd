//! Sink implementations
//!
//! Contains RemoteSink, FileSink, and ValidatingSink.

mod file;
mod remote;
mod validate;

pub use self::file::FileSink;
pub use self::remote::{RemoteSink, RemoteSinkConfig, MAX_DELIVERY_ATTEMPTS};
pub use self::validate::ValidatingSink;

use contracts::{Batch, BatchSink, ContractError};

/// Closed set of configured sink variants.
///
/// The engine holds an ordered list of these, oblivious to which variants
/// are present; adding a sink kind is a compile-time-checked change.
pub enum TargetSink {
    Remote(RemoteSink),
    LocalFile(FileSink),
    Validating(ValidatingSink),
}

impl BatchSink for TargetSink {
    fn name(&self) -> &str {
        match self {
            Self::Remote(sink) => sink.name(),
            Self::LocalFile(sink) => sink.name(),
            Self::Validating(sink) => sink.name(),
        }
    }

    async fn handle_batch(&mut self, batch: Batch<'_>) -> Result<(), ContractError> {
        match self {
            Self::Remote(sink) => sink.handle_batch(batch).await,
            Self::LocalFile(sink) => sink.handle_batch(batch).await,
            Self::Validating(sink) => sink.handle_batch(batch).await,
        }
    }
}
