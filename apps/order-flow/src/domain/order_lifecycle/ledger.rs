//! Order ledger.
//!
//! The authoritative map from client order ID to order state. Shared between
//! the outbound send loop and inbound event dispatch; every public method is
//! one critical section, so updates to the same order never interleave.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::errors::OrderError;
use super::order::Order;
use super::value_objects::{CancelRequest, OrderIntent, OrderStatus};
use crate::domain::shared::{OrderId, Quantity};

/// Result of applying a fill to a tracked order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillApplied {
    /// Status after the fill.
    pub status: OrderStatus,
    /// Cumulative filled quantity.
    pub filled: Quantity,
    /// Quantity still open.
    pub remaining: Quantity,
}

/// Count of tracked orders per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Orders with no fills yet.
    pub new: usize,
    /// Orders partially filled.
    pub partially_filled: usize,
    /// Orders completely filled.
    pub filled: usize,
    /// Orders canceled.
    pub canceled: usize,
}

impl StatusCounts {
    /// Orders in a terminal state.
    #[must_use]
    pub const fn terminal(&self) -> usize {
        self.filled + self.canceled
    }

    /// All tracked orders.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.new + self.partially_filled + self.filled + self.canceled
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    orders: HashMap<OrderId, Order>,
    /// Marking order, for deterministic cancel emission.
    marked: Vec<OrderId>,
}

/// Thread-safe store of every order sent during a run.
#[derive(Debug, Default)]
pub struct OrderLedger {
    state: Mutex<LedgerState>,
}

impl OrderLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new order in status `New`.
    ///
    /// # Errors
    ///
    /// Returns error if the ID is already registered or the intent is invalid.
    pub fn register(&self, id: OrderId, intent: OrderIntent) -> Result<(), OrderError> {
        let mut state = self.state.lock();
        if state.orders.contains_key(&id) {
            return Err(OrderError::DuplicateOrderId {
                order_id: id.to_string(),
            });
        }

        let order = Order::new(id.clone(), intent)?;
        state.orders.insert(id, order);
        Ok(())
    }

    /// Add `qty` to the order's filled quantity.
    ///
    /// # Errors
    ///
    /// Returns error if the order is unknown, terminal, or would be overfilled.
    /// Nothing is mutated on error.
    pub fn record_fill(&self, id: &OrderId, qty: Quantity) -> Result<FillApplied, OrderError> {
        let mut state = self.state.lock();
        let order = state.orders.get_mut(id).ok_or_else(|| OrderError::NotFound {
            order_id: id.to_string(),
        })?;

        let status = order.apply_fill(qty)?;
        Ok(FillApplied {
            status,
            filled: order.filled(),
            remaining: order.remaining(),
        })
    }

    /// Set the order's status.
    ///
    /// # Errors
    ///
    /// Returns error if the order is unknown or the transition is illegal.
    pub fn set_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), OrderError> {
        let mut state = self.state.lock();
        let order = state.orders.get_mut(id).ok_or_else(|| OrderError::NotFound {
            order_id: id.to_string(),
        })?;
        order.transition(status)
    }

    /// Flag the order for cancellation. Marking twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns error if the order is unknown.
    pub fn mark_for_cancellation(&self, id: &OrderId) -> Result<(), OrderError> {
        let mut state = self.state.lock();
        let order = state.orders.get_mut(id).ok_or_else(|| OrderError::NotFound {
            order_id: id.to_string(),
        })?;

        if !order.cancel_requested() {
            order.mark_for_cancellation();
            state.marked.push(id.clone());
        }
        Ok(())
    }

    /// Build a cancel request for the order's remaining quantity.
    ///
    /// Returns `None` if the order is unknown, terminal, or fully filled;
    /// callers treat that as "nothing to cancel".
    #[must_use]
    pub fn build_cancel_request(&self, id: &OrderId) -> Option<CancelRequest> {
        self.state
            .lock()
            .orders
            .get(id)
            .and_then(Order::cancel_request)
    }

    /// Snapshot of a single order.
    #[must_use]
    pub fn snapshot(&self, id: &OrderId) -> Option<Order> {
        self.state.lock().orders.get(id).cloned()
    }

    /// IDs marked for cancellation, in marking order.
    #[must_use]
    pub fn marked_for_cancellation(&self) -> Vec<OrderId> {
        self.state.lock().marked.clone()
    }

    /// Count of orders per status.
    #[must_use]
    pub fn status_counts(&self) -> StatusCounts {
        let state = self.state.lock();
        state
            .orders
            .values()
            .fold(StatusCounts::default(), |mut counts, order| {
                match order.status() {
                    OrderStatus::New => counts.new += 1,
                    OrderStatus::PartiallyFilled => counts.partially_filled += 1,
                    OrderStatus::Filled => counts.filled += 1,
                    OrderStatus::Canceled => counts.canceled += 1,
                }
                counts
            })
    }

    /// Number of tracked orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().orders.len()
    }

    /// Whether no order has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().orders.is_empty()
    }
}
