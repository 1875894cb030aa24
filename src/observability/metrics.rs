//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, route
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_rate_limited_total` (counter): requests rejected by the limiter
//! - `gateway_validation_failures_total` (counter): pipeline rejections by stage, reason
//! - `gateway_node_requests_total` (counter): node calls by operation, outcome
//! - `gateway_node_health` (gauge): 1=reachable, 0=unreachable
//!
//! Recording is a no-op until a recorder is installed, so tests and the CLI
//! never need to initialize anything.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed HTTP request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a request rejected by the rate limiter.
pub fn record_rate_limited() {
    metrics::counter!("gateway_rate_limited_total").increment(1);
}

/// Record a validation stage rejecting a request.
pub fn record_validation_failure(stage: &'static str, reason: &'static str) {
    metrics::counter!(
        "gateway_validation_failures_total",
        "stage" => stage,
        "reason" => reason
    )
    .increment(1);
}

/// Record the outcome of a call to the blockchain node.
pub fn record_node_request(operation: &'static str, outcome: &'static str) {
    metrics::counter!(
        "gateway_node_requests_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record node reachability.
pub fn record_node_health(healthy: bool) {
    metrics::gauge!("gateway_node_health").set(if healthy { 1.0 } else { 0.0 });
}
