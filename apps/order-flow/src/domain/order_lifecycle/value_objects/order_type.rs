//! Order type (market or limit).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order type following FIX tag 40.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Market order - execute at best available price.
    Market,
    /// Limit order - execute at specified price or better.
    Limit,
}

impl OrderType {
    /// All order types in generation order.
    pub const ALL: [Self; 2] = [Self::Market, Self::Limit];

    /// Returns true if this order type requires a limit price.
    #[must_use]
    pub const fn requires_limit_price(&self) -> bool {
        matches!(self, Self::Limit)
    }

    /// Get the FIX protocol tag 40 value.
    #[must_use]
    pub const fn fix_tag_value(&self) -> char {
        match self {
            Self::Market => '1',
            Self::Limit => '2',
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_type_requires_limit_price() {
        assert!(!OrderType::Market.requires_limit_price());
        assert!(OrderType::Limit.requires_limit_price());
    }

    #[test]
    fn order_type_fix_tag_value() {
        assert_eq!(OrderType::Market.fix_tag_value(), '1');
        assert_eq!(OrderType::Limit.fix_tag_value(), '2');
    }

    #[test]
    fn order_type_display() {
        assert_eq!(format!("{}", OrderType::Market), "MARKET");
        assert_eq!(format!("{}", OrderType::Limit), "LIMIT");
    }
}
