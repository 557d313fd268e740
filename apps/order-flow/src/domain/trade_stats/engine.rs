//! Trade statistics from confirmed fills.
//!
//! # Methodology
//!
//! Balance starts at zero. A BUY fill adds to inventory and debits the
//! balance by `price * qty`; a SELL or SHORT fill removes inventory and
//! credits the balance. Open inventory is valued at the instrument's own
//! fill VWAP, not an external mark:
//!
//! ```text
//! PnL = balance + Σ inventory[i] * vwap[i]
//! ```
//!
//! Balance and inventory may both go negative (cash or shares owed).

use std::collections::BTreeMap;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::Transaction;
use crate::domain::order_lifecycle::OrderError;
use crate::domain::shared::{Quantity, Symbol};

/// Running totals for one instrument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentStats {
    /// Σ price × qty over all fills.
    pub traded_value: Decimal,
    /// Σ qty over all fills.
    pub traded_volume: Decimal,
    /// Signed net position (positive = long).
    pub inventory: Decimal,
}

impl InstrumentStats {
    /// Volume-weighted average fill price; zero when nothing traded.
    #[must_use]
    pub fn vwap(&self) -> Decimal {
        if self.traded_volume.is_zero() {
            Decimal::ZERO
        } else {
            self.traded_value / self.traded_volume
        }
    }
}

/// Aggregate statistics for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeStats {
    /// Σ fill quantity across all instruments.
    pub total_volume: Quantity,
    /// Running cash balance.
    pub balance: Decimal,
    /// Per-instrument totals for every instrument that traded.
    pub instruments: BTreeMap<Symbol, InstrumentStats>,
}

/// Totals after one fill, computed before anything is written.
struct Update {
    total_volume: Quantity,
    balance: Decimal,
    instrument: InstrumentStats,
}

fn overflow(transaction: &Transaction, total: &str) -> OrderError {
    OrderError::InvalidParameters {
        field: "last_qty".to_string(),
        message: format!(
            "fill {} {} @ {} overflows {total}",
            transaction.symbol(),
            transaction.quantity(),
            transaction.price()
        ),
    }
}

impl TradeStats {
    /// Accumulate one fill.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidParameters`] if any running total would
    /// overflow. The totals are left unchanged in that case.
    pub fn process(&mut self, transaction: &Transaction) -> Result<(), OrderError> {
        let update = self.plan(transaction)?;
        self.total_volume = update.total_volume;
        self.balance = update.balance;
        self.instruments
            .insert(transaction.symbol().clone(), update.instrument);
        Ok(())
    }

    /// Check that `transaction` can be accumulated, without accumulating it.
    ///
    /// # Errors
    ///
    /// Same as [`TradeStats::process`].
    pub fn check(&self, transaction: &Transaction) -> Result<(), OrderError> {
        self.plan(transaction).map(|_| ())
    }

    fn plan(&self, transaction: &Transaction) -> Result<Update, OrderError> {
        let qty = transaction.quantity().amount();
        let notional = transaction.notional();
        let sign = Decimal::from(transaction.side().sign());
        let current = self
            .instruments
            .get(transaction.symbol())
            .copied()
            .unwrap_or_default();

        let total_volume = self
            .total_volume
            .amount()
            .checked_add(qty)
            .ok_or_else(|| overflow(transaction, "total volume"))?;
        let balance = self
            .balance
            .checked_sub(sign * notional)
            .ok_or_else(|| overflow(transaction, "balance"))?;
        let traded_value = current
            .traded_value
            .checked_add(notional)
            .ok_or_else(|| overflow(transaction, "traded value"))?;
        let traded_volume = current
            .traded_volume
            .checked_add(qty)
            .ok_or_else(|| overflow(transaction, "traded volume"))?;
        let inventory = current
            .inventory
            .checked_add(sign * qty)
            .ok_or_else(|| overflow(transaction, "inventory"))?;

        Ok(Update {
            total_volume: Quantity::new(total_volume),
            balance,
            instrument: InstrumentStats {
                traded_value,
                traded_volume,
                inventory,
            },
        })
    }

    /// VWAP for one instrument; zero if it never traded.
    #[must_use]
    pub fn vwap(&self, symbol: &Symbol) -> Decimal {
        self.instruments
            .get(symbol)
            .map_or(Decimal::ZERO, InstrumentStats::vwap)
    }

    /// Signed inventory for one instrument; zero if it never traded.
    #[must_use]
    pub fn inventory(&self, symbol: &Symbol) -> Decimal {
        self.instruments
            .get(symbol)
            .map_or(Decimal::ZERO, |s| s.inventory)
    }

    /// VWAP for every configured instrument plus any other that traded.
    #[must_use]
    pub fn vwap_table(&self, configured: &[Symbol]) -> BTreeMap<Symbol, Decimal> {
        configured
            .iter()
            .chain(self.instruments.keys())
            .map(|symbol| (symbol.clone(), self.vwap(symbol)))
            .collect()
    }

    /// Mark-to-VWAP value of open inventory.
    ///
    /// Instruments missing from `vwap_table` are valued at zero.
    #[must_use]
    pub fn inventory_value(&self, vwap_table: &BTreeMap<Symbol, Decimal>) -> Decimal {
        self.instruments
            .iter()
            .map(|(symbol, stats)| {
                stats.inventory * vwap_table.get(symbol).copied().unwrap_or(Decimal::ZERO)
            })
            .sum()
    }

    /// `balance + Σ inventory × vwap`.
    #[must_use]
    pub fn pnl(&self, vwap_table: &BTreeMap<Symbol, Decimal>) -> Decimal {
        self.balance + self.inventory_value(vwap_table)
    }

    /// Derive the run summary without mutating anything.
    #[must_use]
    pub fn summarize(&self, configured: &[Symbol]) -> TradeStatsSummary {
        let vwap = self.vwap_table(configured);
        let value_of_inventories = self.inventory_value(&vwap);
        let instruments = vwap
            .iter()
            .map(|(symbol, vwap)| {
                let stats = self.instruments.get(symbol).copied().unwrap_or_default();
                (
                    symbol.clone(),
                    InstrumentSummary {
                        vwap: *vwap,
                        inventory: stats.inventory,
                        traded_volume: stats.traded_volume,
                        traded_value: stats.traded_value,
                    },
                )
            })
            .collect();

        TradeStatsSummary {
            total_volume: self.total_volume,
            balance: self.balance,
            value_of_inventories,
            pnl: self.balance + value_of_inventories,
            instruments,
        }
    }
}

/// Per-instrument line of the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentSummary {
    /// Volume-weighted average fill price.
    pub vwap: Decimal,
    /// Signed net position.
    pub inventory: Decimal,
    /// Σ qty.
    pub traded_volume: Decimal,
    /// Σ price × qty.
    pub traded_value: Decimal,
}

/// Point-in-time view of trade statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeStatsSummary {
    /// Σ fill quantity across all instruments.
    pub total_volume: Quantity,
    /// Cash balance.
    pub balance: Decimal,
    /// Σ inventory × vwap.
    pub value_of_inventories: Decimal,
    /// `balance + value_of_inventories`.
    pub pnl: Decimal,
    /// Every configured instrument, plus any other that traded.
    pub instruments: BTreeMap<Symbol, InstrumentSummary>,
}

/// Shared, lock-guarded trade statistics.
///
/// Each `process` call is one critical section, so balance and inventory
/// never disagree for a reader.
#[derive(Debug)]
pub struct TradeStatsEngine {
    instruments: Vec<Symbol>,
    stats: Mutex<TradeStats>,
}

impl TradeStatsEngine {
    /// Create an engine reporting on the given instruments.
    #[must_use]
    pub fn new(instruments: Vec<Symbol>) -> Self {
        Self {
            instruments,
            stats: Mutex::new(TradeStats::default()),
        }
    }

    /// Configured instruments.
    #[must_use]
    pub fn instruments(&self) -> &[Symbol] {
        &self.instruments
    }

    /// Accumulate one fill.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidParameters`] on overflow, leaving the
    /// totals unchanged.
    pub fn process(&self, transaction: &Transaction) -> Result<(), OrderError> {
        self.stats.lock().process(transaction)?;
        tracing::debug!(
            symbol = %transaction.symbol(),
            side = %transaction.side(),
            qty = %transaction.quantity(),
            price = %transaction.price(),
            "Processed fill"
        );
        Ok(())
    }

    /// Dry run of [`TradeStatsEngine::process`].
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidParameters`] if the fill would overflow.
    pub fn check(&self, transaction: &Transaction) -> Result<(), OrderError> {
        self.stats.lock().check(transaction)
    }

    /// VWAP for one instrument.
    #[must_use]
    pub fn vwap(&self, symbol: &Symbol) -> Decimal {
        self.stats.lock().vwap(symbol)
    }

    /// VWAP for every configured instrument plus any other that traded.
    #[must_use]
    pub fn vwap_table(&self) -> BTreeMap<Symbol, Decimal> {
        self.stats.lock().vwap_table(&self.instruments)
    }

    /// PnL against a VWAP table.
    #[must_use]
    pub fn pnl(&self, vwap_table: &BTreeMap<Symbol, Decimal>) -> Decimal {
        self.stats.lock().pnl(vwap_table)
    }

    /// Copy of the current totals.
    #[must_use]
    pub fn snapshot(&self) -> TradeStats {
        self.stats.lock().clone()
    }

    /// Summary computed from one consistent snapshot. Read-only.
    #[must_use]
    pub fn summarize(&self) -> TradeStatsSummary {
        self.stats.lock().summarize(&self.instruments)
    }
}
