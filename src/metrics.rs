//! Prometheus metrics for upstream fetches and page renders.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

// === Metric Name Constants ===

/// Service A fetch latency metric name.
pub const METRIC_UPSTREAM_FETCH_LATENCY: &str = "upstream_fetch_latency_ms";
/// Failed Service A fetches counter metric name.
pub const METRIC_UPSTREAM_FETCH_FAILURES: &str = "upstream_fetch_failures_total";
/// Home page renders counter metric name.
pub const METRIC_HOME_RENDERS: &str = "home_renders_total";

/// Initialize all metric descriptions.
/// Call this once at startup, after installing a recorder.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_UPSTREAM_FETCH_LATENCY,
        "Service A fetch latency in milliseconds"
    );
    describe_counter!(
        METRIC_UPSTREAM_FETCH_FAILURES,
        "Total number of Service A fetches that fell back to empty data"
    );
    describe_counter!(METRIC_HOME_RENDERS, "Total number of home page renders");

    debug!("Metrics initialized");
}

/// Record Service A fetch latency.
pub fn record_fetch_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_UPSTREAM_FETCH_LATENCY).record(latency_ms);
}

/// Increment failed fetch counter.
pub fn inc_fetch_failures(kind: &'static str) {
    counter!(METRIC_UPSTREAM_FETCH_FAILURES, "kind" => kind).increment(1);
}

/// Increment home page render counter.
pub fn inc_home_renders() {
    counter!(METRIC_HOME_RENDERS).increment(1);
}
