//! Order status in the lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status following FIX protocol semantics.
///
/// FIX Protocol Order Status (Tag 39):
/// - `0` = New
/// - `1` = Partially filled
/// - `2` = Filled
/// - `4` = Canceled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order sent, no fills yet.
    New,
    /// Order partially filled.
    PartiallyFilled,
    /// Order completely filled.
    Filled,
    /// Order canceled.
    Canceled,
}

impl OrderStatus {
    /// Returns true if the order is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Canceled)
    }

    /// Returns true if the order can be canceled.
    #[must_use]
    pub const fn is_cancelable(&self) -> bool {
        matches!(self, Self::New | Self::PartiallyFilled)
    }

    /// Returns true if moving to `next` is a legal lifecycle step.
    ///
    /// Terminal states are never left. Re-entering the current non-terminal
    /// status is allowed (e.g. a second partial fill).
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        match (*self, next) {
            (Self::Filled | Self::Canceled, _) | (Self::PartiallyFilled, Self::New) => false,
            (Self::New | Self::PartiallyFilled, _) => true,
        }
    }

    /// Get the FIX protocol tag 39 value.
    #[must_use]
    pub const fn fix_tag_value(&self) -> char {
        match self {
            Self::New => '0',
            Self::PartiallyFilled => '1',
            Self::Filled => '2',
            Self::Canceled => '4',
        }
    }

    /// Parse a FIX tag 39 value. Statuses outside the tracked set yield `None`.
    #[must_use]
    pub const fn from_fix_tag(value: char) -> Option<Self> {
        match value {
            '0' => Some(Self::New),
            '1' => Some(Self::PartiallyFilled),
            '2' => Some(Self::Filled),
            '4' => Some(Self::Canceled),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "NEW"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Filled => write!(f, "FILLED"),
            Self::Canceled => write!(f, "CANCELED"),
        }
    }
}
