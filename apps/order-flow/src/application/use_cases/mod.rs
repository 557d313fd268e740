//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod run_scenario;

pub use run_scenario::{RunError, RunScenarioUseCase, RunSettings};
