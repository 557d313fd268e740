//! Order intent: a proposed order before it is registered and sent.

use serde::{Deserialize, Serialize};

use super::{OrderSide, OrderType};
use crate::domain::order_lifecycle::errors::OrderError;
use crate::domain::shared::{Price, Quantity, Symbol};

/// Parameters of a new order single before a client order ID is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    /// Instrument to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Requested quantity.
    pub quantity: Quantity,
    /// Order type.
    pub order_type: OrderType,
    /// Limit price, present iff `order_type` is `Limit`.
    pub limit_price: Option<Price>,
}

impl OrderIntent {
    /// Create a market order intent.
    #[must_use]
    pub const fn market(symbol: Symbol, side: OrderSide, quantity: Quantity) -> Self {
        Self {
            symbol,
            side,
            quantity,
            order_type: OrderType::Market,
            limit_price: None,
        }
    }

    /// Create a limit order intent.
    #[must_use]
    pub const fn limit(symbol: Symbol, side: OrderSide, quantity: Quantity, price: Price) -> Self {
        Self {
            symbol,
            side,
            quantity,
            order_type: OrderType::Limit,
            limit_price: Some(price),
        }
    }

    /// Validate the intent before it is sent.
    ///
    /// # Errors
    ///
    /// Returns error if the quantity is not positive, or if the limit price
    /// is missing, non-positive, or present on a market order.
    pub fn validate(&self) -> Result<(), OrderError> {
        if !self.quantity.is_positive() {
            return Err(OrderError::InvalidParameters {
                field: "quantity".to_string(),
                message: format!("must be positive, got {}", self.quantity),
            });
        }

        match (self.order_type.requires_limit_price(), self.limit_price) {
            (true, None) => Err(OrderError::InvalidParameters {
                field: "limit_price".to_string(),
                message: "required for LIMIT orders".to_string(),
            }),
            (true, Some(price)) if !price.is_positive() => Err(OrderError::InvalidParameters {
                field: "limit_price".to_string(),
                message: format!("must be positive, got {price}"),
            }),
            (false, Some(_)) => Err(OrderError::InvalidParameters {
                field: "limit_price".to_string(),
                message: "not allowed on MARKET orders".to_string(),
            }),
            _ => Ok(()),
        }
    }
}
