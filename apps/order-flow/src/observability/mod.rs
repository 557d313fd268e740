//! Observability module for logging and metrics.

mod logging;
mod metrics;

pub use logging::{LogFormat, LoggingConfig, init_logging};
pub use metrics::{
    MetricsConfig, MetricsError, init_metrics, record_cancel_request,
    record_cancel_retries_exhausted, record_inbound_anomaly, record_order_cancelled,
    record_order_filled, record_order_sent, record_send_failure, update_pnl,
};
