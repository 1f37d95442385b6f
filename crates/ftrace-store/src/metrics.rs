//! Event store metrics collection.
//!
//! Request counters by operation and status, latency histograms, and
//! retry counters, emitted through the `metrics` facade.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total store requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "firetrace_store_requests_total";

    /// Total retry attempts by operation.
    pub const RETRIES_TOTAL: &str = "firetrace_store_retries_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "firetrace_store_latency_seconds";

    /// Rows uploaded to the store.
    pub const ROWS_UPLOADED: &str = "firetrace_store_rows_uploaded_total";
}

/// Record metrics for a completed store request.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record a retry attempt.
pub fn record_retry(operation: &str) {
    counter!(
        names::RETRIES_TOTAL,
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Record successfully uploaded rows.
pub fn record_rows_uploaded(count: usize) {
    counter!(names::ROWS_UPLOADED).increment(count as u64);
}
