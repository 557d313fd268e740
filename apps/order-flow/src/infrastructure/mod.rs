//! Infrastructure Layer
//!
//! Adapters for the ports defined in the application layer:
//!
//! - `session/`: Session engine adapters (in-process simulated venue)
//! - `config/`: Dependency injection container

pub mod config;
pub mod session;
