//! Order Lifecycle Bounded Context
//!
//! Tracks every order sent during a run, following FIX protocol semantics.
//!
//! # Key Concepts
//!
//! - **Order**: requested vs. filled quantity, last known status, cancel intent
//! - **Ledger**: the single shared store the send loop and inbound dispatch
//!   both go through
//! - **Cancel requests**: always built from the ledger's current state

pub mod errors;
pub mod ledger;
pub mod order;
pub mod value_objects;

pub use errors::OrderError;
pub use ledger::{FillApplied, OrderLedger, StatusCounts};
pub use order::Order;
pub use value_objects::{CancelRequest, OrderIntent, OrderSide, OrderStatus, OrderType};
