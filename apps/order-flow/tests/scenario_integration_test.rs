//! Scenario Integration Tests
//!
//! Full runs: generator → ledger → session port → dispatcher → statistics.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mockall::mock;
use rust_decimal_macros::dec;

use order_flow::application::ports::{OutboundMessage, SessionError, SessionPort};
use order_flow::config::{Config, VenueConfig};
use order_flow::{Container, RunTermination, Symbol, run_simulated};

mock! {
    pub Session {}

    #[async_trait]
    impl SessionPort for Session {
        async fn send(&self, message: OutboundMessage) -> Result<(), SessionError>;
        async fn close(&self);
    }
}

fn xyz_config(num_orders: usize, cancel_probability: f64, venue: VenueConfig) -> Config {
    let mut config = Config::default();
    config.run.num_orders = num_orders;
    config.run.seed = 2024;
    config.run.drain_ms = 200;
    config.instruments.symbols = vec!["XYZ".to_string()];
    config.instruments.reference_prices = BTreeMap::from([("XYZ".to_string(), dec!(100))]);
    config.instruments.price_band = dec!(5);
    config.cancellation.probability = cancel_probability;
    config.venue = venue;
    config
}

fn filling_venue() -> VenueConfig {
    VenueConfig {
        seed: 11,
        latency_ms: 0,
        partial_fill_probability: 0.5,
        limit_fill_probability: 1.0,
        cancel_reject_probability: 0.0,
    }
}

// =============================================================================
// Simulated venue runs
// =============================================================================

#[tokio::test]
async fn three_orders_without_cancels_all_terminal() {
    let config = xyz_config(3, 0.0, filling_venue());

    let report = run_simulated(&config).await.unwrap();

    assert_eq!(report.termination, RunTermination::Completed);
    assert_eq!(report.orders.total(), 3);
    assert_eq!(report.orders.terminal(), 3);
    assert_eq!(report.orders.filled, 3);
    assert_eq!(report.counters.orders_sent, 3);
    assert_eq!(report.counters.orders_filled, 3);
    assert_eq!(report.counters.cancel_requests_sent, 0);
    assert_eq!(report.counters.anomalies, 0);
    assert_eq!(report.stats.total_volume.amount(), dec!(3000));
    assert!(report.stats.instruments.contains_key(&Symbol::new("XYZ")));
}

#[tokio::test]
async fn resting_orders_are_cancelled() {
    let venue = VenueConfig {
        limit_fill_probability: 0.0,
        ..filling_venue()
    };
    let config = xyz_config(20, 1.0, venue);

    let report = run_simulated(&config).await.unwrap();

    // MARKET orders fill, LIMIT orders rest until cancelled.
    assert!(report.is_completed());
    assert_eq!(report.orders.terminal(), 20);
    assert_eq!(report.orders.filled + report.orders.canceled, 20);
    assert_eq!(report.counters.orders_cancelled, report.orders.canceled as u64);
    assert_eq!(report.counters.cancel_retries, 0);
}

#[tokio::test]
async fn rejected_cancels_stop_at_retry_cap() {
    let venue = VenueConfig {
        limit_fill_probability: 0.0,
        cancel_reject_probability: 1.0,
        ..filling_venue()
    };
    let config = xyz_config(20, 1.0, venue);
    let max_retries = u64::from(config.cancellation.max_retries);

    let report = run_simulated(&config).await.unwrap();

    let resting = report.orders.new as u64;
    assert_eq!(report.orders.canceled, 0);
    assert_eq!(report.orders.filled as u64 + resting, 20);
    assert_eq!(report.counters.cancel_retries, resting * max_retries);
    assert_eq!(report.counters.cancel_retries_exhausted, resting);
    let initial_cancels = report.counters.cancel_requests_sent - report.counters.cancel_retries;
    assert!(initial_cancels >= resting && initial_cancels <= 20);
}

#[tokio::test]
async fn same_seeds_same_report() {
    let venue = VenueConfig {
        limit_fill_probability: 0.5,
        cancel_reject_probability: 0.3,
        ..filling_venue()
    };
    let config = xyz_config(30, 0.4, venue);

    let first = run_simulated(&config).await.unwrap();
    let second = run_simulated(&config).await.unwrap();

    assert_eq!(first.counters, second.counters);
    assert_eq!(first.orders, second.orders);
    assert_eq!(first.stats, second.stats);
}

// =============================================================================
// Session failures
// =============================================================================

#[tokio::test]
async fn send_failure_aborts_with_partial_report() {
    let calls = AtomicUsize::new(0);
    let mut session = MockSession::new();
    session.expect_send().times(3).returning(move |_| {
        if calls.fetch_add(1, Ordering::SeqCst) < 2 {
            Ok(())
        } else {
            Err(SessionError::Transport {
                message: "link down".to_string(),
            })
        }
    });
    session.expect_close().times(1).return_const(());

    let config = xyz_config(5, 0.0, filling_venue());
    let container = Container::new(&config, Arc::new(session)).unwrap();
    container.context().gate.open();

    let report = container.run_scenario_use_case().execute().await;

    match &report.termination {
        RunTermination::Aborted { reason } => assert!(reason.contains("link down")),
        RunTermination::Completed => panic!("run should abort"),
    }
    assert_eq!(report.counters.orders_sent, 2);
    assert_eq!(report.counters.send_failures, 1);
    // The third order was registered before its send failed.
    assert_eq!(report.orders.total(), 3);
}

#[tokio::test(start_paused = true)]
async fn logon_timeout_aborts_before_sending() {
    let mut session = MockSession::new();
    session.expect_send().never();
    session.expect_close().times(1).return_const(());

    let config = xyz_config(5, 0.0, filling_venue());
    let container = Container::new(&config, Arc::new(session)).unwrap();

    let report = container.run_scenario_use_case().execute().await;

    assert!(!report.is_completed());
    assert_eq!(report.counters.orders_sent, 0);
    assert_eq!(report.orders.total(), 0);
}
