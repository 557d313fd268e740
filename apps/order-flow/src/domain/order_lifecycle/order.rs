//! Order entity.
//!
//! Tracks one sent order: what was requested, how much has been filled, the
//! last known status and whether a cancel is intended.
//!
//! # Invariants
//!
//! - `0 <= filled <= quantity`
//! - `status == Filled` implies `filled == quantity`
//! - Terminal states (`Filled`, `Canceled`) are never left

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::OrderError;
use super::value_objects::{CancelRequest, OrderIntent, OrderSide, OrderStatus, OrderType};
use crate::domain::shared::{OrderId, Price, Quantity, Symbol};

/// A sent order and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    symbol: Symbol,
    side: OrderSide,
    order_type: OrderType,
    quantity: Quantity,
    limit_price: Option<Price>,
    status: OrderStatus,
    filled: Quantity,
    cancel_requested: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order in status `New` from a validated intent.
    ///
    /// # Errors
    ///
    /// Returns error if the intent fails validation.
    pub fn new(id: OrderId, intent: OrderIntent) -> Result<Self, OrderError> {
        intent.validate()?;
        let now = Utc::now();
        Ok(Self {
            id,
            symbol: intent.symbol,
            side: intent.side,
            order_type: intent.order_type,
            quantity: intent.quantity,
            limit_price: intent.limit_price,
            status: OrderStatus::New,
            filled: Quantity::ZERO,
            cancel_requested: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Client order ID.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.id
    }

    /// Instrument.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Order side.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Order type.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Requested quantity.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Limit price (limit orders only).
    #[must_use]
    pub const fn limit_price(&self) -> Option<Price> {
        self.limit_price
    }

    /// Last known status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Quantity filled so far.
    #[must_use]
    pub const fn filled(&self) -> Quantity {
        self.filled
    }

    /// Whether the order has been marked for cancellation.
    #[must_use]
    pub const fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last mutation time.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Quantity still open: `quantity - filled`.
    #[must_use]
    pub fn remaining(&self) -> Quantity {
        self.quantity.saturating_sub(self.filled)
    }

    /// Apply a fill and advance the status from the resulting quantities.
    ///
    /// Returns the status after the fill: `Filled` once `filled == quantity`,
    /// otherwise `PartiallyFilled`.
    ///
    /// # Errors
    ///
    /// Returns error if the order is terminal, the fill quantity is not
    /// positive, or the fill would overfill the order. The order is left
    /// untouched on error.
    pub fn apply_fill(&mut self, fill_qty: Quantity) -> Result<OrderStatus, OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::CannotFill {
                order_id: self.id.to_string(),
                status: self.status,
            });
        }

        if !fill_qty.is_positive() {
            return Err(OrderError::InvalidParameters {
                field: "last_qty".to_string(),
                message: format!("fill quantity must be positive, got {fill_qty}"),
            });
        }

        let remaining = self.remaining();
        if fill_qty > remaining {
            return Err(OrderError::FillExceedsRemaining {
                order_id: self.id.to_string(),
                fill_qty: fill_qty.to_string(),
                remaining_qty: remaining.to_string(),
            });
        }

        self.filled += fill_qty;
        self.status = if self.filled == self.quantity {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        self.updated_at = Utc::now();

        Ok(self.status)
    }

    /// Move to a new status without a fill.
    ///
    /// Moving to `Filled` this way is rejected unless the order is already
    /// fully filled, since that would break `filled == quantity`.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is not allowed.
    pub fn transition(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        let fill_mismatch = next == OrderStatus::Filled && self.filled != self.quantity;
        if !self.status.can_transition_to(next) || fill_mismatch {
            return Err(OrderError::InvalidStateTransition {
                order_id: self.id.to_string(),
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Record the intent to cancel this order.
    pub fn mark_for_cancellation(&mut self) {
        self.cancel_requested = true;
    }

    /// Build a cancel request for the remaining quantity.
    ///
    /// Returns `None` when there is nothing left to cancel: the order is
    /// terminal or fully filled.
    #[must_use]
    pub fn cancel_request(&self) -> Option<CancelRequest> {
        let remaining = self.remaining();
        if !self.status.is_cancelable() || remaining.is_zero() {
            return None;
        }

        Some(CancelRequest {
            cl_ord_id: OrderId::generate(),
            orig_cl_ord_id: self.id.clone(),
            symbol: self.symbol.clone(),
            side: self.side,
            quantity: remaining,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_order(qty: u64) -> Order {
        Order::new(
            OrderId::new("ORD-1"),
            OrderIntent::market(Symbol::new("XYZ"), OrderSide::Buy, Quantity::from_u64(qty)),
        )
        .unwrap()
    }

    #[test]
    fn new_order_starts_unfilled() {
        let order = make_order(100);
        assert_eq!(order.status(), OrderStatus::New);
        assert_eq!(order.filled(), Quantity::ZERO);
        assert_eq!(order.remaining(), Quantity::from_u64(100));
        assert!(!order.cancel_requested());
    }

    #[test]
    fn new_order_rejects_invalid_intent() {
        let intent = OrderIntent {
            symbol: Symbol::new("XYZ"),
            side: OrderSide::Buy,
            quantity: Quantity::from_u64(10),
            order_type: OrderType::Limit,
            limit_price: None,
        };
        assert!(Order::new(OrderId::new("ORD-2"), intent).is_err());
    }

    #[test]
    fn partial_then_full_fill() {
        let mut order = make_order(100);

        let status = order.apply_fill(Quantity::from_u64(40)).unwrap();
        assert_eq!(status, OrderStatus::PartiallyFilled);
        assert_eq!(order.remaining(), Quantity::from_u64(60));

        let status = order.apply_fill(Quantity::from_u64(60)).unwrap();
        assert_eq!(status, OrderStatus::Filled);
        assert_eq!(order.filled(), order.quantity());
    }

    #[test]
    fn overfill_is_rejected_without_mutation() {
        let mut order = make_order(100);
        order.apply_fill(Quantity::from_u64(80)).unwrap();

        let err = order.apply_fill(Quantity::from_u64(30)).unwrap_err();
        assert!(matches!(err, OrderError::FillExceedsRemaining { .. }));
        assert_eq!(order.filled(), Quantity::from_u64(80));
        assert_eq!(order.status(), OrderStatus::PartiallyFilled);
    }

    #[test]
    fn fill_after_terminal_is_rejected() {
        let mut order = make_order(100);
        order.transition(OrderStatus::Canceled).unwrap();

        let err = order.apply_fill(Quantity::from_u64(10)).unwrap_err();
        assert!(matches!(err, OrderError::CannotFill { .. }));
        assert_eq!(order.filled(), Quantity::ZERO);
    }

    #[test]
    fn zero_fill_is_rejected() {
        let mut order = make_order(100);
        assert!(order.apply_fill(Quantity::ZERO).is_err());
    }

    #[test]
    fn transition_to_filled_requires_full_quantity() {
        let mut order = make_order(100);
        assert!(order.transition(OrderStatus::Filled).is_err());
        order.apply_fill(Quantity::from_u64(100)).unwrap();
        assert!(order.transition(OrderStatus::Canceled).is_err());
    }

    #[test]
    fn cancel_request_uses_remaining_quantity() {
        let mut order = make_order(100);
        order.apply_fill(Quantity::from_u64(25)).unwrap();

        let request = order.cancel_request().unwrap();
        assert_eq!(request.orig_cl_ord_id, *order.id());
        assert_eq!(request.quantity, Quantity::from_u64(75));
        assert_ne!(request.cl_ord_id, *order.id());
    }

    #[test]
    fn cancel_request_none_when_terminal() {
        let mut order = make_order(100);
        order.apply_fill(Quantity::from_u64(100)).unwrap();
        assert!(order.cancel_request().is_none());

        let mut canceled = make_order(100);
        canceled.apply_fill(Quantity::from_u64(10)).unwrap();
        canceled.transition(OrderStatus::Canceled).unwrap();
        assert!(canceled.cancel_request().is_none());
    }

    #[test]
    fn limit_order_keeps_price() {
        let order = Order::new(
            OrderId::new("ORD-3"),
            OrderIntent::limit(
                Symbol::new("XYZ"),
                OrderSide::Short,
                Quantity::from_u64(5),
                Price::new(dec!(99.5)),
            ),
        )
        .unwrap();
        assert_eq!(order.limit_price(), Some(Price::new(dec!(99.5))));
        assert_eq!(order.order_type(), OrderType::Limit);
    }
}
