//! Pipeline run statistics.

use std::time::Duration;

use engine::EngineStats;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    /// Engine counters (messages, records, batches, checkpoints)
    pub engine: EngineStats,

    /// Number of sinks that received batches
    pub active_sinks: usize,

    /// Total duration of the run
    pub duration: Duration,
}

impl RunStats {
    /// Record throughput over the whole run
    pub fn records_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.engine.records as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print a human-readable summary.
    ///
    /// Goes to stderr; stdout carries the checkpoint stream.
    pub fn print_summary(&self) {
        eprintln!("\n=== Run Summary ===\n");
        eprintln!("Messages handled:    {}", self.engine.messages);
        eprintln!("Records:             {}", self.engine.records);
        eprintln!("Batches delivered:   {}", self.engine.batches);
        eprintln!("Checkpoints emitted: {}", self.engine.checkpoints);
        eprintln!("Sinks:               {}", self.active_sinks);
        eprintln!(
            "Duration:            {:.2}s ({:.1} records/s)",
            self.duration.as_secs_f64(),
            self.records_per_second()
        );
        eprintln!();
    }
}
