//! Metrics collection and exposition.
//!
//! # Metrics
//! - `woo_proxy_requests_total` (counter): requests by method, status
//! - `woo_proxy_request_duration_seconds` (histogram): latency by method
//! - `woo_proxy_upstream_errors_total` (counter): transport failures by kind
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, start_time: Instant) {
    let method = method.to_string();
    counter!(
        "woo_proxy_requests_total",
        "method" => method.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("woo_proxy_request_duration_seconds", "method" => method)
        .record(start_time.elapsed().as_secs_f64());
}

/// Record an upstream transport failure.
pub fn record_upstream_error(kind: &'static str) {
    counter!("woo_proxy_upstream_errors_total", "kind" => kind).increment(1);
}
