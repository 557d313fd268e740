//! Run-wide counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::observability;

/// Counters shared by the send loop and inbound dispatch.
///
/// Each increment also feeds the matching Prometheus counter.
#[derive(Debug, Default)]
pub struct RunCounters {
    orders_sent: AtomicU64,
    orders_filled: AtomicU64,
    orders_cancelled: AtomicU64,
    cancel_requests_sent: AtomicU64,
    cancel_retries: AtomicU64,
    cancel_retries_exhausted: AtomicU64,
    anomalies: AtomicU64,
    send_failures: AtomicU64,
}

impl RunCounters {
    /// Create zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A new order went out.
    pub fn order_sent(&self, order_type: &str, side: &str) {
        self.orders_sent.fetch_add(1, Ordering::Relaxed);
        observability::record_order_sent(order_type, side);
    }

    /// An order reached FILLED.
    pub fn order_filled(&self, symbol: &str) {
        self.orders_filled.fetch_add(1, Ordering::Relaxed);
        observability::record_order_filled(symbol);
    }

    /// An order reached CANCELED.
    pub fn order_cancelled(&self) {
        self.orders_cancelled.fetch_add(1, Ordering::Relaxed);
        observability::record_order_cancelled();
    }

    /// A first cancel request went out.
    pub fn cancel_request_sent(&self) {
        self.cancel_requests_sent.fetch_add(1, Ordering::Relaxed);
        observability::record_cancel_request("initial");
    }

    /// A cancel request was resubmitted after a reject.
    pub fn cancel_retry_sent(&self) {
        self.cancel_requests_sent.fetch_add(1, Ordering::Relaxed);
        self.cancel_retries.fetch_add(1, Ordering::Relaxed);
        observability::record_cancel_request("retry");
    }

    /// An order ran out of cancel retries.
    pub fn cancel_retries_exhausted(&self) {
        self.cancel_retries_exhausted.fetch_add(1, Ordering::Relaxed);
        observability::record_cancel_retries_exhausted();
    }

    /// An inbound event could not be applied.
    pub fn anomaly(&self, reason: &str) {
        self.anomalies.fetch_add(1, Ordering::Relaxed);
        observability::record_inbound_anomaly(reason);
    }

    /// A send failed.
    pub fn send_failure(&self, msg_type: &str) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
        observability::record_send_failure(msg_type);
    }

    /// Current values.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            orders_sent: self.orders_sent.load(Ordering::Relaxed),
            orders_filled: self.orders_filled.load(Ordering::Relaxed),
            orders_cancelled: self.orders_cancelled.load(Ordering::Relaxed),
            cancel_requests_sent: self.cancel_requests_sent.load(Ordering::Relaxed),
            cancel_retries: self.cancel_retries.load(Ordering::Relaxed),
            cancel_retries_exhausted: self.cancel_retries_exhausted.load(Ordering::Relaxed),
            anomalies: self.anomalies.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time counter values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    /// New orders sent.
    pub orders_sent: u64,
    /// Orders that reached FILLED.
    pub orders_filled: u64,
    /// Orders that reached CANCELED.
    pub orders_cancelled: u64,
    /// Cancel requests sent, retries included.
    pub cancel_requests_sent: u64,
    /// Cancel requests resubmitted after a reject.
    pub cancel_retries: u64,
    /// Orders whose cancel retries ran out.
    pub cancel_retries_exhausted: u64,
    /// Inbound events that could not be applied.
    pub anomalies: u64,
    /// Sends that failed.
    pub send_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_count_as_cancel_requests() {
        let counters = RunCounters::new();
        counters.cancel_request_sent();
        counters.cancel_retry_sent();
        counters.cancel_retry_sent();

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.cancel_requests_sent, 3);
        assert_eq!(snapshot.cancel_retries, 2);
    }

    #[test]
    fn snapshot_reflects_increments() {
        let counters = RunCounters::new();
        counters.order_sent("LIMIT", "BUY");
        counters.order_sent("MARKET", "SELL");
        counters.order_filled("XYZ");
        counters.order_cancelled();
        counters.anomaly("unknown_order");

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.orders_sent, 2);
        assert_eq!(snapshot.orders_filled, 1);
        assert_eq!(snapshot.orders_cancelled, 1);
        assert_eq!(snapshot.anomalies, 1);
        assert_eq!(snapshot.send_failures, 0);
    }
}
