//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_messages_routed_total` (counter): deliveries by router, channel
//! - `relay_messages_dropped_total` (counter): messages no target accepted, by router
//! - `relay_http_requests_total` (counter): outbound calls by method, content type, outcome

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_routed(router: &str, channel: &str) {
    metrics::counter!(
        "relay_messages_routed_total",
        "router" => router.to_string(),
        "channel" => channel.to_string()
    )
    .increment(1);
}

pub fn record_dropped(router: &str) {
    metrics::counter!("relay_messages_dropped_total", "router" => router.to_string()).increment(1);
}

pub fn record_http_request(method: &str, content_type: &str, outcome: &'static str) {
    metrics::counter!(
        "relay_http_requests_total",
        "method" => method.to_string(),
        "content_type" => content_type.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
