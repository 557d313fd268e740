//! Order Generation
//!
//! Synthetic order intents from a seeded random stream.

mod generator;

pub use generator::{GenerationError, GeneratorConfig, RandomOrderGenerator};
