//! Metrics collection.
//!
//! # Metrics
//! - `deployer_rpc_calls_total` (counter): JSON-RPC calls by method, outcome
//! - `deployer_rpc_duration_seconds` (histogram): latency by method
//! - `deployer_submissions_total` (counter): submissions by outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every update is dropped
//! - The Prometheus recorder is in-process only, rendered on demand

use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Record one JSON-RPC round trip. `outcome` is `ok`, `rejected` or
/// `network_error`.
pub fn record_rpc_call(method: &str, outcome: &'static str, elapsed: Duration) {
    ::metrics::counter!(
        "deployer_rpc_calls_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    ::metrics::histogram!("deployer_rpc_duration_seconds", "method" => method.to_string())
        .record(elapsed.as_secs_f64());
}

/// Record the final outcome of a submission.
pub fn record_submission(outcome: &'static str) {
    ::metrics::counter!("deployer_submissions_total", "outcome" => outcome).increment(1);
}

/// Install the process-wide Prometheus recorder.
///
/// Returns `None` when a recorder is already installed.
pub fn install_recorder() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Metrics recorder not installed");
            None
        }
    }
}

/// Log the rendered snapshot, one line per sample.
pub fn log_snapshot(handle: &PrometheusHandle) {
    for line in handle.render().lines().filter(|l| !l.starts_with('#') && !l.is_empty()) {
        tracing::info!(sample = line, "metric");
    }
}
