// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Order Flow Generator - Rust Core Library
//!
//! Synthetic order flow against a FIX-style venue session: seeded random
//! new orders and cancels out, asynchronous execution reports in, with the
//! lifecycle of every order and the resulting trade statistics tracked.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic
//!   - `order_lifecycle`: Order state, status transitions, the shared ledger
//!   - `trade_stats`: Volume, inventory, VWAP and PnL
//!   - `generation`: Seeded random order intents
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: `SessionPort`, the seam to the session engine
//!   - `services`: Inbound dispatch, cancel retry, logon gate, counters
//!   - `use_cases`: `RunScenario`
//!   - `dto`: End-of-run report
//!
//! - **Infrastructure**: Adapters
//!   - `session`: Simulated venue
//!   - `config`: Dependency injection container
//!
//! Cross-cutting: `config` (YAML configuration) and `observability`
//! (tracing and Prometheus metrics).

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and wiring.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// YAML configuration.
pub mod config;

/// Logging and metrics.
pub mod observability;

// =============================================================================
// Re-exports
// =============================================================================

pub use application::dto::{RunReport, RunTermination};
pub use application::ports::{SessionError, SessionEvent, SessionPort};
pub use application::use_cases::{RunScenarioUseCase, RunSettings};
pub use config::{Config, ConfigError};
pub use domain::order_lifecycle::{
    Order, OrderError, OrderIntent, OrderLedger, OrderSide, OrderStatus, OrderType,
};
pub use domain::shared::{OrderId, Price, Quantity, Symbol};
pub use domain::trade_stats::{TradeStatsEngine, TradeStatsSummary, Transaction};
pub use infrastructure::config::{Container, ContainerError, run_simulated};
pub use infrastructure::session::SimulatedVenue;
