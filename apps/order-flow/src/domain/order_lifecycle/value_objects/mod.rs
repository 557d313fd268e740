//! Order Lifecycle Value Objects
//!
//! Immutable types for order management.

mod cancel_request;
mod order_intent;
mod order_side;
mod order_status;
mod order_type;

pub use cancel_request::CancelRequest;
pub use order_intent::OrderIntent;
pub use order_side::OrderSide;
pub use order_status::OrderStatus;
pub use order_type::OrderType;
