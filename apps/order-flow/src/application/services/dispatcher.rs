//! Session event dispatch.
//!
//! Applies every event the session engine delivers to the ledger, the
//! statistics and the counters. Events are processed one at a time in
//! arrival order, so reports for the same order are never applied
//! concurrently.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::prelude::ToPrimitive;
use tokio::sync::mpsc;

use super::cancellation::RetryDecision;
use super::inbound_event::{FillReport, InboundEvent};
use super::run_context::RunContext;
use super::run_counters::RunCounters;
use crate::application::ports::{OutboundMessage, SessionEvent, SessionPort};
use crate::domain::order_lifecycle::{CancelRequest, OrderError, OrderLedger, OrderStatus};
use crate::domain::shared::OrderId;
use crate::domain::trade_stats::Transaction;
use crate::observability;

/// What handling one event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Logon seen; the send loop may start.
    SessionReady,
    /// Logout seen; summary logged.
    SessionClosed,
    /// Order acknowledged.
    Acknowledged,
    /// Fill applied to ledger and statistics.
    FillApplied {
        /// Order status after the fill.
        status: OrderStatus,
    },
    /// Order moved to CANCELED.
    Canceled,
    /// A rejected cancel was resubmitted (or scheduled).
    CancelResubmitted {
        /// Resubmission number for the order.
        attempt: u32,
    },
    /// The order has no cancel retries left.
    CancelRetriesExhausted,
    /// Cancel rejected for an order with nothing left to cancel.
    NothingToCancel,
    /// Venue rejected an order or message.
    Rejected,
    /// Event could not be applied; nothing was mutated.
    Anomaly {
        /// Short reason label.
        reason: &'static str,
    },
}

/// Applies session events to shared run state.
pub struct SessionEventDispatcher<S: SessionPort + 'static> {
    context: RunContext,
    session: Arc<S>,
}

impl<S: SessionPort + 'static> SessionEventDispatcher<S> {
    /// Create a dispatcher over shared run state.
    pub const fn new(context: RunContext, session: Arc<S>) -> Self {
        Self { context, session }
    }

    /// Consume events until the session engine drops its sender.
    ///
    /// Closes the ready gate on exit so a send loop still waiting for logon
    /// is released.
    pub async fn run(&self, mut events: mpsc::UnboundedReceiver<SessionEvent>) {
        while let Some(event) = events.recv().await {
            let outcome = self.dispatch(event).await;
            tracing::trace!(?outcome, "Session event handled");
        }
        self.context.gate.close();
        tracing::debug!("Session event stream ended");
    }

    /// Handle one session event.
    pub async fn dispatch(&self, event: SessionEvent) -> DispatchOutcome {
        match event {
            SessionEvent::LoggedOn => {
                tracing::info!("Session logged on");
                self.context.gate.open();
                DispatchOutcome::SessionReady
            }
            SessionEvent::LoggedOut => {
                self.context.gate.close();
                self.log_summary();
                DispatchOutcome::SessionClosed
            }
            SessionEvent::Application(message) => {
                let event = InboundEvent::from_message(message);
                tracing::trace!(kind = event.kind(), "Inbound message classified");
                self.handle(event).await
            }
        }
    }

    /// Handle one classified inbound event.
    pub async fn handle(&self, event: InboundEvent) -> DispatchOutcome {
        match event {
            InboundEvent::NewAck { cl_ord_id } => self.on_new_ack(&cl_ord_id),
            InboundEvent::PartiallyFilled(fill) => {
                self.on_fill(fill, OrderStatus::PartiallyFilled)
            }
            InboundEvent::Filled(fill) => self.on_fill(fill, OrderStatus::Filled),
            InboundEvent::Canceled { cl_ord_id } => self.on_canceled(&cl_ord_id),
            InboundEvent::CancelRejected {
                orig_cl_ord_id,
                reason,
            } => self.on_cancel_rejected(&orig_cl_ord_id, reason).await,
            InboundEvent::Rejected { cl_ord_id, reason } => {
                tracing::warn!(
                    order_id = cl_ord_id.as_ref().map(OrderId::as_str),
                    reason = reason.as_deref(),
                    "Venue rejected message"
                );
                DispatchOutcome::Rejected
            }
            InboundEvent::Unknown { description } => {
                tracing::warn!(description = %description, "Unhandled inbound message");
                self.context.counters.anomaly("unhandled");
                DispatchOutcome::Anomaly { reason: "unhandled" }
            }
        }
    }

    fn on_new_ack(&self, id: &OrderId) -> DispatchOutcome {
        if self.context.ledger.snapshot(id).is_none() {
            return self.anomaly(
                id,
                &OrderError::NotFound {
                    order_id: id.to_string(),
                },
            );
        }
        tracing::debug!(order_id = %id, "Order acknowledged");
        DispatchOutcome::Acknowledged
    }

    fn on_fill(&self, fill: FillReport, reported: OrderStatus) -> DispatchOutcome {
        let ledger = &self.context.ledger;
        let Some(order) = ledger.snapshot(&fill.cl_ord_id) else {
            return self.anomaly(
                &fill.cl_ord_id,
                &OrderError::NotFound {
                    order_id: fill.cl_ord_id.to_string(),
                },
            );
        };

        let symbol = fill.symbol.unwrap_or_else(|| order.symbol().clone());
        let side = fill.side.unwrap_or(order.side());
        let transaction = match Transaction::new(symbol, side, fill.last_qty, fill.last_px) {
            Ok(transaction) => transaction,
            Err(e) => return self.anomaly(&fill.cl_ord_id, &e),
        };
        if let Err(e) = self.context.stats.check(&transaction) {
            return self.anomaly(&fill.cl_ord_id, &e);
        }

        let applied = match ledger.record_fill(&fill.cl_ord_id, fill.last_qty) {
            Ok(applied) => applied,
            Err(e) => return self.anomaly(&fill.cl_ord_id, &e),
        };
        // Only this task writes stats, so a passed check cannot fail here.
        if let Err(e) = self.context.stats.process(&transaction) {
            return self.anomaly(&fill.cl_ord_id, &e);
        }

        if applied.status != reported {
            tracing::warn!(
                order_id = %fill.cl_ord_id,
                reported = %reported,
                computed = %applied.status,
                filled = %applied.filled,
                "Reported status disagrees with filled quantity"
            );
        }
        if applied.status == OrderStatus::Filled {
            self.context.counters.order_filled(transaction.symbol().as_str());
        }

        tracing::info!(
            order_id = %fill.cl_ord_id,
            symbol = %transaction.symbol(),
            side = %transaction.side(),
            last_qty = %fill.last_qty,
            last_px = %fill.last_px,
            status = %applied.status,
            remaining = %applied.remaining,
            "Fill applied"
        );
        DispatchOutcome::FillApplied {
            status: applied.status,
        }
    }

    fn on_canceled(&self, id: &OrderId) -> DispatchOutcome {
        match self.context.ledger.set_status(id, OrderStatus::Canceled) {
            Ok(()) => {
                self.context.counters.order_cancelled();
                tracing::info!(order_id = %id, "Order canceled");
                DispatchOutcome::Canceled
            }
            Err(e) => self.anomaly(id, &e),
        }
    }

    async fn on_cancel_rejected(&self, orig_id: &OrderId, reason: Option<String>) -> DispatchOutcome {
        tracing::info!(
            order_id = %orig_id,
            reason = reason.as_deref(),
            "Cancel rejected"
        );

        match self.context.coordinator.on_cancel_rejected(orig_id) {
            RetryDecision::Resubmit {
                request,
                attempt,
                delay,
            } => {
                if delay.is_zero() {
                    send_cancel_retry(self.session.as_ref(), &self.context.counters, request, attempt)
                        .await;
                } else {
                    self.schedule_retry(orig_id.clone(), attempt, delay);
                }
                DispatchOutcome::CancelResubmitted { attempt }
            }
            RetryDecision::Exhausted { attempts } => {
                tracing::warn!(order_id = %orig_id, attempts, "Cancel retries exhausted");
                self.context.counters.cancel_retries_exhausted();
                DispatchOutcome::CancelRetriesExhausted
            }
            RetryDecision::NothingToCancel => {
                tracing::debug!(
                    order_id = %orig_id,
                    retries = self.context.coordinator.retries_for(orig_id),
                    "Nothing left to cancel"
                );
                DispatchOutcome::NothingToCancel
            }
        }
    }

    /// Resubmit after `delay`, rebuilding the request from the ledger at send time.
    fn schedule_retry(&self, orig_id: OrderId, attempt: u32, delay: Duration) {
        let ledger: Arc<OrderLedger> = Arc::clone(&self.context.ledger);
        let counters = Arc::clone(&self.context.counters);
        let session = Arc::clone(&self.session);

        tracing::debug!(order_id = %orig_id, attempt, ?delay, "Cancel retry scheduled");
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match ledger.build_cancel_request(&orig_id) {
                Some(request) => {
                    send_cancel_retry(session.as_ref(), &counters, request, attempt).await;
                }
                None => tracing::debug!(order_id = %orig_id, "Order closed before cancel retry"),
            }
        });
    }

    fn anomaly(&self, id: &OrderId, error: &OrderError) -> DispatchOutcome {
        let reason = anomaly_reason(error);
        tracing::warn!(order_id = %id, reason, error = %error, "Inbound event not applied");
        self.context.counters.anomaly(reason);
        DispatchOutcome::Anomaly { reason }
    }

    fn log_summary(&self) {
        let counters = self.context.counters.snapshot();
        let summary = self.context.stats.summarize();

        tracing::info!(
            orders_sent = counters.orders_sent,
            orders_filled = counters.orders_filled,
            orders_cancelled = counters.orders_cancelled,
            cancel_requests = counters.cancel_requests_sent,
            "Session logged out"
        );
        for (symbol, line) in &summary.instruments {
            tracing::info!(
                symbol = %symbol,
                vwap = %line.vwap.round_dp(4),
                inventory = %line.inventory,
                "Instrument summary"
            );
        }
        tracing::info!(
            total_volume = %summary.total_volume,
            balance = %summary.balance,
            value_of_inventories = %summary.value_of_inventories.round_dp(4),
            pnl = %summary.pnl.round_dp(4),
            "Trade statistics"
        );

        if let Some(pnl) = summary.pnl.to_f64() {
            observability::update_pnl(pnl);
        }
    }
}

async fn send_cancel_retry<S: SessionPort + ?Sized>(
    session: &S,
    counters: &RunCounters,
    request: CancelRequest,
    attempt: u32,
) {
    let orig_id = request.orig_cl_ord_id.clone();
    let remaining = request.quantity;
    let message = OutboundMessage::Cancel(request);
    let msg_type = message.msg_type();

    match session.send(message).await {
        Ok(()) => {
            counters.cancel_retry_sent();
            tracing::info!(order_id = %orig_id, attempt, remaining = %remaining, "Cancel resubmitted");
        }
        Err(e) => {
            counters.send_failure(msg_type);
            tracing::error!(order_id = %orig_id, attempt, error = %e, "Cancel resubmission failed");
        }
    }
}

const fn anomaly_reason(error: &OrderError) -> &'static str {
    match error {
        OrderError::NotFound { .. } => "unknown_order",
        OrderError::CannotFill { .. } | OrderError::InvalidStateTransition { .. } => {
            "terminal_order"
        }
        OrderError::FillExceedsRemaining { .. } => "overfill",
        OrderError::InvalidParameters { .. } | OrderError::DuplicateOrderId { .. } => "malformed",
    }
}
