//! Timing accumulator for the two main pipeline phases
//!
//! Informational only; never safety-relevant.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Shared accumulator of time spent serializing batches vs delivering them.
///
/// Cloned handles share one set of counters; components receive an explicit
/// handle instead of reaching for global state.
#[derive(Debug, Clone)]
pub struct TimingsHandle {
    inner: Arc<TimingsInner>,
}

#[derive(Debug)]
struct TimingsInner {
    started: Instant,
    serializing_us: AtomicU64,
    delivering_us: AtomicU64,
}

impl TimingsHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TimingsInner {
                started: Instant::now(),
                serializing_us: AtomicU64::new(0),
                delivering_us: AtomicU64::new(0),
            }),
        }
    }

    /// Attribute elapsed time to batch serialization
    pub fn add_serializing(&self, elapsed: Duration) {
        self.inner
            .serializing_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    /// Attribute elapsed time to delivery
    pub fn add_delivering(&self, elapsed: Duration) {
        self.inner
            .delivering_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    /// Total time attributed to serialization
    pub fn serializing(&self) -> Duration {
        Duration::from_micros(self.inner.serializing_us.load(Ordering::Relaxed))
    }

    /// Total time attributed to delivery
    pub fn delivering(&self) -> Duration {
        Duration::from_micros(self.inner.delivering_us.load(Ordering::Relaxed))
    }

    /// Wall-clock time not attributed to either phase
    pub fn unattributed(&self) -> Duration {
        self.inner
            .started
            .elapsed()
            .saturating_sub(self.serializing() + self.delivering())
    }

    /// Log the accumulated totals; called at every checkpoint emission.
    pub fn log_timings(&self) {
        info!(
            unspecified_secs = format!("{:.3}", self.unattributed().as_secs_f64()),
            serializing_secs = format!("{:.3}", self.serializing().as_secs_f64()),
            delivering_secs = format!("{:.3}", self.delivering().as_secs_f64()),
            "Timings"
        );
    }
}

impl Default for TimingsHandle {
    fn default() -> Self {
        Self::new()
    }
}
