//! One-shot anonymous usage notification

use std::time::Duration;

use tracing::debug;

/// Usage collector endpoint
const COLLECTOR_URL: &str = "https://collector.stitchdata.com/i";

/// Send the anonymous usage event.
///
/// Best-effort: every failure is swallowed and logged at debug level; this
/// must never affect the pipeline.
pub async fn report_usage(version: &str) {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            debug!(error = %e, "Collection request failed");
            return;
        }
    };

    let result = client
        .get(COLLECTOR_URL)
        .query(&[
            ("e", "se"),
            ("aid", "singer"),
            ("se_ca", "stitch-target"),
            ("se_ac", "open"),
            ("se_la", version),
        ])
        .send()
        .await;

    if let Err(e) = result {
        debug!(error = %e, "Collection request failed");
    }
}
