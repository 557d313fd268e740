//! Simulated venue configuration.

use serde::{Deserialize, Serialize};

/// Behaviour of the in-process simulated venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueConfig {
    /// Seed of the venue's own random stream.
    #[serde(default = "default_venue_seed")]
    pub seed: u64,
    /// Delay before each report is delivered, in milliseconds.
    #[serde(default)]
    pub latency_ms: u64,
    /// Probability that a fill is split into two partial executions.
    #[serde(default = "default_partial_fill_probability")]
    pub partial_fill_probability: f64,
    /// Probability that a LIMIT order fills instead of resting.
    #[serde(default = "default_limit_fill_probability")]
    pub limit_fill_probability: f64,
    /// Probability that a cancel of an open order is rejected anyway.
    #[serde(default = "default_cancel_reject_probability")]
    pub cancel_reject_probability: f64,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            seed: default_venue_seed(),
            latency_ms: 0,
            partial_fill_probability: default_partial_fill_probability(),
            limit_fill_probability: default_limit_fill_probability(),
            cancel_reject_probability: default_cancel_reject_probability(),
        }
    }
}

const fn default_venue_seed() -> u64 {
    7
}

const fn default_partial_fill_probability() -> f64 {
    0.3
}

const fn default_limit_fill_probability() -> f64 {
    0.6
}

const fn default_cancel_reject_probability() -> f64 {
    0.1
}
