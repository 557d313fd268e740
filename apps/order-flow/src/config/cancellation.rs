//! Cancellation configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::services::CancelRetryPolicy;

/// Which orders get a cancel and how rejected cancels are retried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationConfig {
    /// Probability that a sent order is marked for cancellation.
    #[serde(default = "default_probability")]
    pub probability: f64,
    /// Maximum resubmissions per order after a cancel reject.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the first resubmission; 0 resubmits immediately.
    #[serde(default)]
    pub initial_backoff_ms: u64,
    /// Upper bound on the resubmission delay.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Growth factor between consecutive delays.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for CancellationConfig {
    fn default() -> Self {
        Self {
            probability: default_probability(),
            max_retries: default_max_retries(),
            initial_backoff_ms: 0,
            max_backoff_ms: default_max_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl CancellationConfig {
    /// Convert to the coordinator's retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> CancelRetryPolicy {
        CancelRetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            backoff_multiplier: self.backoff_multiplier,
        }
    }
}

const fn default_probability() -> f64 {
    0.3
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_max_backoff_ms() -> u64 {
    1_000 // 1 second
}

const fn default_backoff_multiplier() -> f64 {
    2.0
}
