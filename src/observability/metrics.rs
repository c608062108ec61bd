//! Metrics collection and exposition.
//!
//! # Metrics
//! - `trigger_requests_total` (counter): requests by method, route, status
//! - `trigger_request_duration_seconds` (histogram): latency by method, route
//! - `trigger_actions_total` (counter): runner invocations by action, outcome
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Route label is the configured pattern, never the raw path

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "trigger_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "trigger_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a runner invocation.
pub fn record_action(action: &str, outcome: &'static str) {
    metrics::counter!(
        "trigger_actions_total",
        "action" => action.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
