//! Shared state for one run.

use std::sync::Arc;

use super::cancellation::{CancelRetryPolicy, CancellationCoordinator, CancellationError};
use super::ready_gate::ReadyGate;
use super::run_counters::RunCounters;
use crate::domain::order_lifecycle::OrderLedger;
use crate::domain::shared::Symbol;
use crate::domain::trade_stats::TradeStatsEngine;

/// Components shared by the send loop and inbound dispatch.
///
/// Cloning shares the same underlying state.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Order ledger.
    pub ledger: Arc<OrderLedger>,
    /// Trade statistics.
    pub stats: Arc<TradeStatsEngine>,
    /// Cancel selection and retries.
    pub coordinator: Arc<CancellationCoordinator>,
    /// Run counters.
    pub counters: Arc<RunCounters>,
    /// Logon gate.
    pub gate: ReadyGate,
}

impl RunContext {
    /// Fresh context with an empty ledger and zeroed statistics.
    ///
    /// # Errors
    ///
    /// Returns error if the cancel settings are invalid.
    pub fn new(
        instruments: Vec<Symbol>,
        cancel_probability: f64,
        retry_policy: CancelRetryPolicy,
    ) -> Result<Self, CancellationError> {
        let ledger = Arc::new(OrderLedger::new());
        let coordinator =
            CancellationCoordinator::new(Arc::clone(&ledger), cancel_probability, retry_policy)?;

        Ok(Self {
            ledger,
            stats: Arc::new(TradeStatsEngine::new(instruments)),
            coordinator: Arc::new(coordinator),
            counters: Arc::new(RunCounters::new()),
            gate: ReadyGate::new(),
        })
    }
}
