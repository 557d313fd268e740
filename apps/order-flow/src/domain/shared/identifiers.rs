//! Strongly-typed identifiers for domain entities.
//!
//! Client order IDs follow the `ORD-YYYYMMDD-<hex>-<digits>` layout used on
//! the wire as `ClOrdID` (tag 11).

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(OrderId, "Client order identifier (FIX `ClOrdID`).");

impl OrderId {
    /// Generate a fresh client order ID.
    ///
    /// Combines the current UTC date with two independent UUID v4 draws, so
    /// identifiers are never reused within or across runs.
    #[must_use]
    pub fn generate() -> Self {
        let date = chrono::Utc::now().format("%Y%m%d");
        let unique = uuid::Uuid::new_v4().simple().to_string();
        let sequence = uuid::Uuid::new_v4().as_u128() % 1_000_000;
        Self(format!("ORD-{date}-{}-{sequence:06}", &unique[..10]))
    }
}
