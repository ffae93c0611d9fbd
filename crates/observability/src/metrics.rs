//! Pipeline metrics helpers

use metrics::{counter, gauge, histogram};

/// Record one flushed batch
pub fn record_batch_flushed(stream: &str, messages: usize, raw_bytes: usize) {
    counter!("stitch_target_batches_flushed_total", "stream" => stream.to_string()).increment(1);
    histogram!("stitch_target_batch_messages").record(messages as f64);
    histogram!("stitch_target_batch_raw_bytes").record(raw_bytes as f64);
}

/// Record one emitted checkpoint
pub fn record_checkpoint_emitted() {
    counter!("stitch_target_checkpoints_emitted_total").increment(1);
}

/// Record one delivery request attempt
pub fn record_request_posted(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "stitch_target_requests_posted_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record the current buffered message depth
pub fn record_buffer_depth(messages: usize, bytes: usize) {
    gauge!("stitch_target_buffer_messages").set(messages as f64);
    gauge!("stitch_target_buffer_bytes").set(bytes as f64);
}
