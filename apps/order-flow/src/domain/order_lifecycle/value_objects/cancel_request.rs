//! Order cancel request (FIX `OrderCancelRequest`, MsgType F).

use serde::{Deserialize, Serialize};

use super::OrderSide;
use crate::domain::shared::{OrderId, Quantity, Symbol};

/// A cancel request for a previously sent order.
///
/// Carries its own `ClOrdID` plus the `OrigClOrdID` of the order being
/// canceled. `quantity` is the remaining (unfilled) quantity at build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequest {
    /// Client ID of this cancel request.
    pub cl_ord_id: OrderId,
    /// Client ID of the order to cancel.
    pub orig_cl_ord_id: OrderId,
    /// Instrument of the original order.
    pub symbol: Symbol,
    /// Side of the original order.
    pub side: OrderSide,
    /// Remaining quantity to cancel.
    pub quantity: Quantity,
}
