//! Periodic process memory reporter

use std::time::Duration;

use sysinfo::System;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Interval between memory usage reports
const REPORT_INTERVAL: Duration = Duration::from_secs(30);

/// Spawn a background task that logs process memory usage every 30 seconds.
///
/// Best-effort instrumentation: it shares no state with the pipeline and any
/// failure only disables the reporter.
pub fn spawn_memory_reporter() -> JoinHandle<()> {
    tokio::spawn(async {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => pid,
            Err(e) => {
                debug!(error = %e, "Memory reporter disabled");
                return;
            }
        };

        let mut system = System::new();
        loop {
            if system.refresh_process(pid) {
                if let Some(process) = system.process(pid) {
                    info!(
                        resident_bytes = process.memory(),
                        virtual_bytes = process.virtual_memory(),
                        "Memory usage"
                    );
                }
            }
            tokio::time::sleep(REPORT_INTERVAL).await;
        }
    })
}
