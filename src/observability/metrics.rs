//! Metrics collection and exposition.
//!
//! # Metrics
//! - `store_balancer_backend_up` (gauge): 1=up, 0=down
//! - `store_balancer_backend_connections` (gauge): advisory connection count after a probe
//! - `store_balancer_probe_latency_seconds` (histogram): probe round trip
//! - `store_balancer_probes_total` (counter): probes by result
//! - `store_balancer_selections_total` (counter): selections by backend and fallback

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "failed to install metrics exporter")
        }
    }
}

pub fn record_backend_health(backend: &str, up: bool) {
    gauge!("store_balancer_backend_up", "backend" => backend.to_string())
        .set(if up { 1.0 } else { 0.0 });
}

pub fn record_backend_connections(backend: &str, connections: u64) {
    gauge!("store_balancer_backend_connections", "backend" => backend.to_string())
        .set(connections as f64);
}

pub fn record_probe(backend: &str, success: bool, latency: Duration) {
    let result = if success { "success" } else { "failure" };
    counter!(
        "store_balancer_probes_total",
        "backend" => backend.to_string(),
        "result" => result
    )
    .increment(1);
    histogram!("store_balancer_probe_latency_seconds", "backend" => backend.to_string())
        .record(latency.as_secs_f64());
}

pub fn record_selection(backend: &str, fallback: bool) {
    counter!(
        "store_balancer_selections_total",
        "backend" => backend.to_string(),
        "fallback" => if fallback { "true" } else { "false" }
    )
    .increment(1);
}
