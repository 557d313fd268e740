//! Prometheus metrics for order flow runs.
//!
//! Counters mirror the run report. Recording is a no-op until a recorder is
//! installed, so library users and tests pay nothing.

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone, Copy)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
}

impl MetricsConfig {
    /// Create a metrics configuration with a custom address.
    #[must_use]
    pub const fn with_addr(listen_addr: SocketAddr) -> Self {
        Self { listen_addr }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Order Flow Metrics
// ============================================================================

/// Record a new order sent.
///
/// # Arguments
///
/// * `order_type` - "MARKET" or "LIMIT"
/// * `side` - "BUY", "SELL" or "SHORT"
pub fn record_order_sent(order_type: &str, side: &str) {
    counter!(
        "orders_sent_total",
        "order_type" => order_type.to_string(),
        "side" => side.to_string()
    )
    .increment(1);
}

/// Record an order reaching FILLED.
pub fn record_order_filled(symbol: &str) {
    counter!("orders_filled_total", "symbol" => symbol.to_string()).increment(1);
}

/// Record an order reaching CANCELED.
pub fn record_order_cancelled() {
    counter!("orders_cancelled_total").increment(1);
}

/// Record a cancel request sent.
///
/// # Arguments
///
/// * `kind` - "initial" or "retry"
pub fn record_cancel_request(kind: &str) {
    counter!("cancel_requests_total", "kind" => kind.to_string()).increment(1);
}

/// Record an order whose cancel retries ran out.
pub fn record_cancel_retries_exhausted() {
    counter!("cancel_retries_exhausted_total").increment(1);
}

/// Record an inbound event that could not be applied.
///
/// # Arguments
///
/// * `reason` - e.g. `"unknown_order"`, `"terminal_order"`, `"malformed"`
pub fn record_inbound_anomaly(reason: &str) {
    counter!("inbound_anomalies_total", "reason" => reason.to_string()).increment(1);
}

/// Record a failed send.
pub fn record_send_failure(msg_type: &str) {
    counter!("send_failures_total", "msg_type" => msg_type.to_string()).increment(1);
}

/// Update the PnL gauge.
pub fn update_pnl(pnl: f64) {
    gauge!("pnl").set(pnl);
}
