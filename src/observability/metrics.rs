//! Metrics collection and exposition.
//!
//! # Metrics
//! - `time_server_connections_total` (counter): TCP connections accepted
//! - `time_server_handshake_failures_total` (counter): failed or timed-out TLS handshakes
//! - `time_server_requests_total` (counter): requests by `kind`
//! - `time_server_active_connections` (gauge): live connections
//!
//! # Design Decisions
//! - Recording is a no-op until `init_metrics` installs the Prometheus recorder
//! - Labels limited to the request kind to keep cardinality fixed

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and serve it over HTTP at `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

pub fn record_connection_accepted() {
    metrics::counter!("time_server_connections_total").increment(1);
}

pub fn record_handshake_failure() {
    metrics::counter!("time_server_handshake_failures_total").increment(1);
}

/// Count one handled request. `kind` is `get_time`, `set_timezone` or `unrecognized`.
pub fn record_request(kind: &'static str) {
    metrics::counter!("time_server_requests_total", "kind" => kind).increment(1);
}

pub fn set_active_connections(count: u64) {
    metrics::gauge!("time_server_active_connections").set(count as f64);
}
