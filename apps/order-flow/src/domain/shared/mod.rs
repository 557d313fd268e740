//! Shared Domain Types
//!
//! Value objects shared across bounded contexts.

mod identifiers;
mod price;
mod quantity;
mod symbol;

pub use identifiers::OrderId;
pub use price::Price;
pub use quantity::Quantity;
pub use symbol::Symbol;
