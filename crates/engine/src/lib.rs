//! # Engine
//!
//! The buffer & flush core.
//!
//! Responsibilities:
//! - Buffer bufferable messages, homogeneous in (stream, version)
//! - Evaluate the OR'd flush triggers (bytes / records / elapsed time)
//! - Fan each finished batch out to every configured sink, in order
//! - Emit the pending checkpoint only after a fully delivered flush

mod engine;

pub use engine::{EngineStats, PipelineEngine};
