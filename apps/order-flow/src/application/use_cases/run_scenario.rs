//! Run Scenario Use Case
//!
//! Drives one run end to end: wait for logon, generate and send every
//! order, send cancels for the marked ones, let inbound reports drain,
//! close the session and report.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::application::dto::{RunReport, RunTermination};
use crate::application::ports::{NewOrderSingle, OutboundMessage, SessionError, SessionPort};
use crate::application::services::RunContext;
use crate::domain::generation::{GenerationError, RandomOrderGenerator};
use crate::domain::order_lifecycle::OrderError;
use crate::domain::shared::OrderId;

/// Interval at which the drain phase checks for open orders.
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Knobs for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    /// Orders to send.
    pub num_orders: usize,
    /// Seed of the order stream.
    pub seed: u64,
    /// Maximum time to wait for outstanding reports after the last send.
    pub drain: Duration,
    /// Maximum time to wait for logon.
    pub logon_timeout: Duration,
}

/// Errors that stop a run early.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Session never became ready.
    #[error("session not ready: {0}")]
    NotReady(#[source] SessionError),

    /// Generator produced no valid intent.
    #[error("order generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Ledger refused the order.
    #[error("ledger rejected order: {0}")]
    Ledger(#[from] OrderError),

    /// Transport failed while sending.
    #[error("failed to send {msg_type} {cl_ord_id}: {source}")]
    Send {
        /// FIX MsgType.
        msg_type: &'static str,
        /// `ClOrdID` of the message.
        cl_ord_id: OrderId,
        /// Underlying error.
        #[source]
        source: SessionError,
    },
}

/// Use case that runs one order flow scenario.
pub struct RunScenarioUseCase<S: SessionPort> {
    settings: RunSettings,
    generator: RandomOrderGenerator,
    context: RunContext,
    session: Arc<S>,
}

impl<S: SessionPort> RunScenarioUseCase<S> {
    /// Create a new `RunScenarioUseCase`.
    pub const fn new(
        settings: RunSettings,
        generator: RandomOrderGenerator,
        context: RunContext,
        session: Arc<S>,
    ) -> Self {
        Self {
            settings,
            generator,
            context,
            session,
        }
    }

    /// Shared run state.
    pub const fn context(&self) -> &RunContext {
        &self.context
    }

    /// Run with the configured seed.
    pub async fn execute(&self) -> RunReport {
        let mut rng = StdRng::seed_from_u64(self.settings.seed);
        self.execute_with_rng(&mut rng).await
    }

    /// Run drawing from `rng`.
    ///
    /// Never fails: an early stop is reported as [`RunTermination::Aborted`]
    /// alongside whatever state was reached.
    pub async fn execute_with_rng<R: Rng + Send>(&self, rng: &mut R) -> RunReport {
        let started_at = Utc::now();
        tracing::info!(
            num_orders = self.settings.num_orders,
            seed = self.settings.seed,
            "Run starting"
        );

        let termination = match self.send_all(rng).await {
            Ok(()) => {
                self.drain().await;
                RunTermination::Completed
            }
            Err(e) => {
                tracing::error!(error = %e, "Run aborted");
                RunTermination::Aborted {
                    reason: e.to_string(),
                }
            }
        };

        self.session.close().await;

        let report = RunReport {
            seed: self.settings.seed,
            num_orders: self.settings.num_orders,
            started_at,
            finished_at: Utc::now(),
            termination,
            counters: self.context.counters.snapshot(),
            orders: self.context.ledger.status_counts(),
            stats: self.context.stats.summarize(),
        };
        tracing::info!(
            orders_sent = report.counters.orders_sent,
            orders_filled = report.counters.orders_filled,
            orders_cancelled = report.counters.orders_cancelled,
            pnl = %report.stats.pnl.round_dp(4),
            completed = report.is_completed(),
            "Run finished"
        );
        report
    }

    async fn send_all<R: Rng + Send>(&self, rng: &mut R) -> Result<(), RunError> {
        self.context
            .gate
            .wait_ready_for(self.settings.logon_timeout)
            .await
            .map_err(RunError::NotReady)?;

        for _ in 0..self.settings.num_orders {
            self.send_one(rng).await?;
        }

        let cancels = self.context.coordinator.cancel_marked();
        tracing::info!(count = cancels.len(), "Sending cancel requests");
        for request in cancels {
            self.send(OutboundMessage::Cancel(request)).await?;
            self.context.counters.cancel_request_sent();
        }
        Ok(())
    }

    async fn send_one<R: Rng + Send>(&self, rng: &mut R) -> Result<(), RunError> {
        let intent = self.generator.next(rng)?;
        let cl_ord_id = OrderId::generate();

        self.context.ledger.register(cl_ord_id.clone(), intent.clone())?;
        if self.context.coordinator.should_cancel(rng) {
            self.context.coordinator.mark(&cl_ord_id)?;
        }

        let order_type = intent.order_type.to_string();
        let side = intent.side.to_string();
        tracing::debug!(
            order_id = %cl_ord_id,
            symbol = %intent.symbol,
            side = %side,
            order_type = %order_type,
            limit_price = ?intent.limit_price,
            "Sending order"
        );

        self.send(OutboundMessage::NewOrder(NewOrderSingle { cl_ord_id, intent }))
            .await?;
        self.context.counters.order_sent(&order_type, &side);
        Ok(())
    }

    async fn send(&self, message: OutboundMessage) -> Result<(), RunError> {
        let msg_type = message.msg_type();
        let cl_ord_id = message.cl_ord_id().clone();

        self.session.send(message).await.map_err(|source| {
            self.context.counters.send_failure(msg_type);
            RunError::Send {
                msg_type,
                cl_ord_id,
                source,
            }
        })
    }

    /// Wait for reports until every order is terminal or the drain period ends.
    async fn drain(&self) {
        let deadline = tokio::time::Instant::now() + self.settings.drain;
        loop {
            let counts = self.context.ledger.status_counts();
            if counts.terminal() == counts.total() {
                tracing::debug!("All orders terminal");
                return;
            }
            if tokio::time::Instant::now() >= deadline {
                tracing::info!(
                    open = counts.total() - counts.terminal(),
                    "Drain period elapsed with open orders"
                );
                return;
            }
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    }
}
