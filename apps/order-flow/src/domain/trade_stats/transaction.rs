//! Transaction (fill) value object.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_lifecycle::{OrderError, OrderSide};
use crate::domain::shared::{Price, Quantity, Symbol};

/// One confirmed execution: partial or full fill of an order.
///
/// Immutable once built; consumed exactly once by the stats engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    symbol: Symbol,
    side: OrderSide,
    quantity: Quantity,
    price: Price,
    notional: Decimal,
}

impl Transaction {
    /// Build a transaction from an execution report's last fill.
    ///
    /// # Errors
    ///
    /// Returns error if quantity or price is not positive, or if
    /// `price * quantity` does not fit in a decimal.
    pub fn new(
        symbol: Symbol,
        side: OrderSide,
        quantity: Quantity,
        price: Price,
    ) -> Result<Self, OrderError> {
        if !quantity.is_positive() {
            return Err(OrderError::InvalidParameters {
                field: "last_qty".to_string(),
                message: format!("fill quantity must be positive, got {quantity}"),
            });
        }
        if !price.is_positive() {
            return Err(OrderError::InvalidParameters {
                field: "last_px".to_string(),
                message: format!("fill price must be positive, got {price}"),
            });
        }

        let notional =
            price
                .checked_notional(quantity)
                .ok_or_else(|| OrderError::InvalidParameters {
                    field: "last_px".to_string(),
                    message: format!("fill {quantity} @ {price} overflows notional"),
                })?;

        Ok(Self {
            symbol,
            side,
            quantity,
            price,
            notional,
        })
    }

    /// Instrument filled.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Side of the fill.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Fill quantity.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Fill price.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// `price * quantity`.
    #[must_use]
    pub const fn notional(&self) -> Decimal {
        self.notional
    }
}
