//! Run configuration: how many orders, which seed, how long to wait.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Orders to send.
    #[serde(default = "default_num_orders")]
    pub num_orders: usize,
    /// Fixed quantity of every order.
    #[serde(default = "default_order_quantity")]
    pub order_quantity: u64,
    /// Seed of the order stream.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Time to wait for outstanding reports after the last send, in milliseconds.
    #[serde(default = "default_drain_ms")]
    pub drain_ms: u64,
    /// Time to wait for logon, in seconds.
    #[serde(default = "default_logon_timeout")]
    pub logon_timeout_seconds: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_orders: default_num_orders(),
            order_quantity: default_order_quantity(),
            seed: default_seed(),
            drain_ms: default_drain_ms(),
            logon_timeout_seconds: default_logon_timeout(),
        }
    }
}

impl RunConfig {
    /// Drain period.
    #[must_use]
    pub const fn drain(&self) -> Duration {
        Duration::from_millis(self.drain_ms)
    }

    /// Logon timeout.
    #[must_use]
    pub const fn logon_timeout(&self) -> Duration {
        Duration::from_secs(self.logon_timeout_seconds)
    }
}

const fn default_num_orders() -> usize {
    100
}

const fn default_order_quantity() -> u64 {
    1000
}

const fn default_seed() -> u64 {
    42
}

const fn default_drain_ms() -> u64 {
    5_000 // 5 seconds
}

const fn default_logon_timeout() -> u64 {
    30 // 30 seconds
}
