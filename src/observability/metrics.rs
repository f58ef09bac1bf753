//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): requests by route event and status
//! - `gate_request_duration_seconds` (histogram): end-to-end latency
//! - `gate_assessment_duration_seconds` (histogram): backend call latency
//! - `gate_backend_failures_total` (counter): failed calls by kind
//! - `gate_pass_through_total` (counter): requests forwarded unassessed
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &str, status: u16, started: Instant) {
    counter!(
        "gate_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gate_request_duration_seconds", "route" => route.to_string())
        .record(started.elapsed().as_secs_f64());
}

pub fn record_assessment(mode: &'static str, result: &'static str, started: Instant) {
    histogram!(
        "gate_assessment_duration_seconds",
        "mode" => mode,
        "result" => result
    )
    .record(started.elapsed().as_secs_f64());
}

pub fn record_backend_failure(kind: &'static str) {
    counter!("gate_backend_failures_total", "kind" => kind).increment(1);
}

pub fn record_pass_through() {
    counter!("gate_pass_through_total").increment(1);
}
