//! Trade Statistics Bounded Context
//!
//! Volume, inventory, VWAP and PnL derived from confirmed fills.

mod engine;
mod transaction;

pub use engine::{
    InstrumentStats, InstrumentSummary, TradeStats, TradeStatsEngine, TradeStatsSummary,
};
pub use transaction::Transaction;
