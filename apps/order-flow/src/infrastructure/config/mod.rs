//! Application wiring.

mod container;

pub use container::{Container, ContainerError, run_simulated};
