//! Application Layer
//!
//! The application layer orchestrates domain logic through use cases.
//! It defines:
//!
//! - **Ports**: Interface to the FIX session engine
//! - **Services**: Inbound dispatch, cancel coordination, logon gate
//! - **Use Cases**: The order flow run
//! - **DTOs**: The run report

pub mod dto;
pub mod ports;
pub mod services;
pub mod use_cases;

pub use dto::*;
pub use ports::*;
pub use use_cases::*;
