//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Delivery Model
//! - Messages are immutable once parsed
//! - Batches are homogeneous in (stream, version)
//! - A checkpoint is safe to emit only after its preceding batch is delivered

mod config;
mod error;
mod message;
mod sink;
mod source;

pub use config::*;
pub use error::*;
pub use message::*;
pub use sink::*;
pub use source::*;
