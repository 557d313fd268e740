//! Typed inbound events.
//!
//! Raw venue messages are classified once, here, into a closed set of
//! variants. Everything downstream matches on [`InboundEvent`].

use crate::application::ports::{InboundMessage, MsgType};
use crate::domain::order_lifecycle::{OrderSide, OrderStatus};
use crate::domain::shared::{OrderId, Price, Quantity, Symbol};

/// Fill details carried by an execution report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillReport {
    /// Order filled.
    pub cl_ord_id: OrderId,
    /// Symbol as reported (falls back to the ledger when absent).
    pub symbol: Option<Symbol>,
    /// Side as reported (falls back to the ledger when absent).
    pub side: Option<OrderSide>,
    /// `LastShares`.
    pub last_qty: Quantity,
    /// `LastPx`.
    pub last_px: Price,
}

/// One classified inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Execution report, status New.
    NewAck {
        /// Order acknowledged.
        cl_ord_id: OrderId,
    },
    /// Execution report, status Partially Filled.
    PartiallyFilled(FillReport),
    /// Execution report, status Filled.
    Filled(FillReport),
    /// Execution report, status Canceled.
    Canceled {
        /// The original order that was canceled.
        cl_ord_id: OrderId,
    },
    /// Order cancel reject.
    CancelRejected {
        /// The order the rejected cancel targeted.
        orig_cl_ord_id: OrderId,
        /// Venue text, if any.
        reason: Option<String>,
    },
    /// Order or business-level reject.
    Rejected {
        /// Order concerned, if the venue said.
        cl_ord_id: Option<OrderId>,
        /// Venue text, if any.
        reason: Option<String>,
    },
    /// Anything else, including malformed messages.
    Unknown {
        /// What made it unclassifiable.
        description: String,
    },
}

impl InboundEvent {
    /// Classify a raw inbound message.
    #[must_use]
    pub fn from_message(message: InboundMessage) -> Self {
        match message.msg_type {
            MsgType::ExecutionReport => Self::from_execution_report(message),
            MsgType::OrderCancelReject => match message.orig_cl_ord_id {
                Some(orig_cl_ord_id) => Self::CancelRejected {
                    orig_cl_ord_id,
                    reason: message.text,
                },
                None => Self::Unknown {
                    description: "cancel reject without OrigClOrdID".to_string(),
                },
            },
            MsgType::Reject => Self::Rejected {
                cl_ord_id: message.cl_ord_id,
                reason: message.text,
            },
            MsgType::Other(raw) => Self::Unknown {
                description: format!("unhandled message type {raw}"),
            },
        }
    }

    fn from_execution_report(message: InboundMessage) -> Self {
        let Some(cl_ord_id) = message.cl_ord_id else {
            return Self::Unknown {
                description: "execution report without ClOrdID".to_string(),
            };
        };
        let Some(raw_status) = message.ord_status else {
            return Self::Unknown {
                description: format!("execution report for {cl_ord_id} without OrdStatus"),
            };
        };

        match OrderStatus::from_fix_tag(raw_status) {
            Some(OrderStatus::New) => Self::NewAck { cl_ord_id },
            // Cancel confirmations carry the cancel request's ClOrdID and the
            // original order in OrigClOrdID.
            Some(OrderStatus::Canceled) => Self::Canceled {
                cl_ord_id: message.orig_cl_ord_id.unwrap_or(cl_ord_id),
            },
            Some(status @ (OrderStatus::PartiallyFilled | OrderStatus::Filled)) => {
                let (Some(last_qty), Some(last_px)) = (message.last_qty, message.last_px) else {
                    return Self::Unknown {
                        description: format!("fill report for {cl_ord_id} without LastShares/LastPx"),
                    };
                };
                let fill = FillReport {
                    cl_ord_id,
                    symbol: message.symbol,
                    side: message.side,
                    last_qty,
                    last_px,
                };
                if status == OrderStatus::Filled {
                    Self::Filled(fill)
                } else {
                    Self::PartiallyFilled(fill)
                }
            }
            None if raw_status == '8' => Self::Rejected {
                cl_ord_id: Some(cl_ord_id),
                reason: message.text,
            },
            None => Self::Unknown {
                description: format!("execution report for {cl_ord_id} with OrdStatus {raw_status}"),
            },
        }
    }

    /// Short label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NewAck { .. } => "new_ack",
            Self::PartiallyFilled(_) => "partially_filled",
            Self::Filled(_) => "filled",
            Self::Canceled { .. } => "canceled",
            Self::CancelRejected { .. } => "cancel_rejected",
            Self::Rejected { .. } => "rejected",
            Self::Unknown { .. } => "unknown",
        }
    }
}
