//! Order side (buy, sell, sell short).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side following FIX tag 54.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    /// Buy order.
    Buy,
    /// Sell order.
    Sell,
    /// Sell short order.
    Short,
}

impl OrderSide {
    /// All sides in generation order.
    pub const ALL: [Self; 3] = [Self::Buy, Self::Sell, Self::Short];

    /// Returns the sign applied to inventory.
    ///
    /// Buy = +1, Sell/Short = -1
    #[must_use]
    pub const fn sign(&self) -> i32 {
        match self {
            Self::Buy => 1,
            Self::Sell | Self::Short => -1,
        }
    }

    /// Returns true for the buying side.
    #[must_use]
    pub const fn is_buy(&self) -> bool {
        matches!(self, Self::Buy)
    }

    /// Get the FIX protocol tag 54 value.
    #[must_use]
    pub const fn fix_tag_value(&self) -> char {
        match self {
            Self::Buy => '1',
            Self::Sell => '2',
            Self::Short => '5',
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Short => write!(f, "SHORT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn order_side_sign() {
        assert_eq!(OrderSide::Buy.sign(), 1);
        assert_eq!(OrderSide::Sell.sign(), -1);
        assert_eq!(OrderSide::Short.sign(), -1);
    }

    #[test_case(OrderSide::Buy, '1' ; "buy")]
    #[test_case(OrderSide::Sell, '2' ; "sell")]
    #[test_case(OrderSide::Short, '5' ; "short")]
    fn order_side_fix_tag(side: OrderSide, tag: char) {
        assert_eq!(side.fix_tag_value(), tag);
    }

    #[test]
    fn order_side_serde() {
        let json = serde_json::to_string(&OrderSide::Short).unwrap();
        assert_eq!(json, "\"SHORT\"");

        let parsed: OrderSide = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(parsed, OrderSide::Sell);
    }
}
