//! BatchSink trait - delivery output interface
//!
//! Defines the abstract interface for Sinks.

use crate::{Batch, ContractError};

/// Batch consumer trait
///
/// All sink implementations must implement this trait. The engine holds an
/// ordered list of sinks and calls them sequentially per flushed batch.
#[trait_variant::make(BatchSink: Send)]
pub trait LocalBatchSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Consume one finished batch
    ///
    /// # Errors
    /// Returns a delivery or validation error; the engine aborts the current
    /// flush (and thus the run) without emitting the pending checkpoint.
    async fn handle_batch(&mut self, batch: Batch<'_>) -> Result<(), ContractError>;
}
