//! Session Port (Driven Port)
//!
//! Interface to the FIX session engine. The engine owns logon, sequencing,
//! encoding and transport; the core only sends fully-formed application
//! messages and receives [`SessionEvent`]s.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::order_lifecycle::{CancelRequest, OrderIntent, OrderSide};
use crate::domain::shared::{OrderId, Price, Quantity, Symbol};

/// New order single (FIX MsgType D).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderSingle {
    /// Client order ID.
    pub cl_ord_id: OrderId,
    /// Order parameters.
    pub intent: OrderIntent,
}

/// Application message sent to the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// New order single (D).
    NewOrder(NewOrderSingle),
    /// Order cancel request (F).
    Cancel(CancelRequest),
}

impl OutboundMessage {
    /// FIX MsgType (tag 35).
    #[must_use]
    pub const fn msg_type(&self) -> &'static str {
        match self {
            Self::NewOrder(_) => "D",
            Self::Cancel(_) => "F",
        }
    }

    /// `ClOrdID` of the message.
    #[must_use]
    pub const fn cl_ord_id(&self) -> &OrderId {
        match self {
            Self::NewOrder(order) => &order.cl_ord_id,
            Self::Cancel(cancel) => &cancel.cl_ord_id,
        }
    }
}

/// Inbound application message type (FIX tag 35).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MsgType {
    /// Execution report (8).
    ExecutionReport,
    /// Order cancel reject (9).
    OrderCancelReject,
    /// Session or business-level reject (3 / j).
    Reject,
    /// Anything else the venue sends.
    Other(String),
}

impl MsgType {
    /// Map a raw FIX MsgType value.
    #[must_use]
    pub fn from_fix(value: &str) -> Self {
        match value {
            "8" => Self::ExecutionReport,
            "9" => Self::OrderCancelReject,
            "3" | "j" => Self::Reject,
            other => Self::Other(other.to_string()),
        }
    }
}

/// One received application message, as delivered by the session engine.
///
/// Fields are optional because the venue decides what to populate; the
/// dispatcher validates what each message type needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Message type.
    pub msg_type: MsgType,
    /// `ClOrdID` (11).
    pub cl_ord_id: Option<OrderId>,
    /// `OrigClOrdID` (41), on cancel-related messages.
    pub orig_cl_ord_id: Option<OrderId>,
    /// `OrdStatus` (39), raw FIX value.
    pub ord_status: Option<char>,
    /// `Symbol` (55).
    pub symbol: Option<Symbol>,
    /// `Side` (54).
    pub side: Option<OrderSide>,
    /// `LastShares` (32).
    pub last_qty: Option<Quantity>,
    /// `LastPx` (31).
    pub last_px: Option<Price>,
    /// `Text` (58).
    pub text: Option<String>,
}

impl InboundMessage {
    /// Empty message of the given type.
    #[must_use]
    pub const fn new(msg_type: MsgType) -> Self {
        Self {
            msg_type,
            cl_ord_id: None,
            orig_cl_ord_id: None,
            ord_status: None,
            symbol: None,
            side: None,
            last_qty: None,
            last_px: None,
            text: None,
        }
    }

    /// Execution report carrying only a status.
    #[must_use]
    pub fn execution_report(cl_ord_id: OrderId, ord_status: char) -> Self {
        Self {
            cl_ord_id: Some(cl_ord_id),
            ord_status: Some(ord_status),
            ..Self::new(MsgType::ExecutionReport)
        }
    }

    /// Execution report for a fill (status `1` or `2`).
    #[must_use]
    pub fn fill_report(
        cl_ord_id: OrderId,
        ord_status: char,
        symbol: Symbol,
        side: OrderSide,
        last_qty: Quantity,
        last_px: Price,
    ) -> Self {
        Self {
            symbol: Some(symbol),
            side: Some(side),
            last_qty: Some(last_qty),
            last_px: Some(last_px),
            ..Self::execution_report(cl_ord_id, ord_status)
        }
    }

    /// Order cancel reject for the given original order.
    #[must_use]
    pub fn cancel_reject(cl_ord_id: OrderId, orig_cl_ord_id: OrderId, text: &str) -> Self {
        Self {
            cl_ord_id: Some(cl_ord_id),
            orig_cl_ord_id: Some(orig_cl_ord_id),
            text: Some(text.to_string()),
            ..Self::new(MsgType::OrderCancelReject)
        }
    }

    /// Set `OrigClOrdID`.
    #[must_use]
    pub fn with_orig_cl_ord_id(mut self, orig_cl_ord_id: OrderId) -> Self {
        self.orig_cl_ord_id = Some(orig_cl_ord_id);
        self
    }
}

/// Everything the session engine delivers to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Session established; fires once per run.
    LoggedOn,
    /// Session ended.
    LoggedOut,
    /// Inbound application message.
    Application(InboundMessage),
}

/// Session port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Transport failure while sending.
    #[error("Session transport error: {message}")]
    Transport {
        /// Error details.
        message: String,
    },

    /// Send attempted before logon.
    #[error("Session is not logged on")]
    NotLoggedOn,

    /// Session closed.
    #[error("Session closed")]
    Closed,

    /// Timed out waiting for logon.
    #[error("Timed out after {seconds}s waiting for logon")]
    LogonTimeout {
        /// Seconds waited.
        seconds: u64,
    },
}

/// Port for sending application messages over the session.
#[async_trait]
pub trait SessionPort: Send + Sync {
    /// Transmit a fully-formed order or cancel request.
    ///
    /// # Errors
    ///
    /// Returns error on transport or session failure.
    async fn send(&self, message: OutboundMessage) -> Result<(), SessionError>;

    /// Release the session (logout). Idempotent.
    async fn close(&self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("8", MsgType::ExecutionReport ; "execution report")]
    #[test_case("9", MsgType::OrderCancelReject ; "cancel reject")]
    #[test_case("3", MsgType::Reject ; "session reject")]
    #[test_case("j", MsgType::Reject ; "business reject")]
    #[test_case("AE", MsgType::Other("AE".to_string()) ; "trade capture report")]
    fn msg_type_from_fix(raw: &str, expected: MsgType) {
        assert_eq!(MsgType::from_fix(raw), expected);
    }

    #[test]
    fn outbound_message_identity() {
        let cancel = CancelRequest {
            cl_ord_id: OrderId::new("CXL-1"),
            orig_cl_ord_id: OrderId::new("ORD-1"),
            symbol: Symbol::new("XYZ"),
            side: OrderSide::Buy,
            quantity: Quantity::from_u64(10),
        };
        let message = OutboundMessage::Cancel(cancel);
        assert_eq!(message.msg_type(), "F");
        assert_eq!(message.cl_ord_id().as_str(), "CXL-1");
    }

    #[test]
    fn cancel_reject_builder() {
        let msg = InboundMessage::cancel_reject(
            OrderId::new("CXL-1"),
            OrderId::new("ORD-1"),
            "Too late to cancel",
        );
        assert_eq!(msg.msg_type, MsgType::OrderCancelReject);
        assert_eq!(msg.orig_cl_ord_id, Some(OrderId::new("ORD-1")));
        assert_eq!(msg.text.as_deref(), Some("Too late to cancel"));
    }
}
