//! Domain Layer
//!
//! Business logic with no transport or runtime dependencies.
//!
//! # Bounded Contexts
//!
//! - [`order_lifecycle`]: Per-order state from send to terminal status
//! - [`trade_stats`]: Volume, inventory, VWAP and PnL from fills
//! - [`generation`]: Seeded synthetic order intents

pub mod generation;
pub mod order_lifecycle;
pub mod shared;
pub mod trade_stats;
