//! Run report DTO.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::CounterSnapshot;
use crate::domain::order_lifecycle::StatusCounts;
use crate::domain::trade_stats::TradeStatsSummary;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunTermination {
    /// Every order was sent and the drain period elapsed.
    Completed,
    /// The run stopped early.
    Aborted {
        /// Why.
        reason: String,
    },
}

/// Final report of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Seed of the order stream.
    pub seed: u64,
    /// Orders requested.
    pub num_orders: usize,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the report was built.
    pub finished_at: DateTime<Utc>,
    /// How the run ended.
    pub termination: RunTermination,
    /// Run counters.
    pub counters: CounterSnapshot,
    /// Ledger orders by last known status.
    pub orders: StatusCounts,
    /// Trade statistics.
    pub stats: TradeStatsSummary,
}

impl RunReport {
    /// True if the run was not aborted.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.termination, RunTermination::Completed)
    }
}
