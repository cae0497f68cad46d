//! Metrics collection and exposition.
//!
//! # Metrics
//! - `streamnode_requests_total` (counter): requests by route, status
//! - `streamnode_request_duration_seconds` (histogram): latency by route

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and scrape endpoint.
///
/// Failure to install is logged and non-fatal; the proxy serves without
/// metrics rather than refusing to start.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!(
                "streamnode_requests_total",
                "Total requests served, by route and status"
            );
            describe_histogram!(
                "streamnode_request_duration_seconds",
                "Request latency in seconds, by route"
            );
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Record one served request.
pub fn record_request(route: &'static str, status: u16, start: Instant) {
    counter!(
        "streamnode_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("streamnode_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}
