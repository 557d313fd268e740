//! Cancellation coordination.
//!
//! Decides which orders get a cancel, builds cancel requests from the
//! ledger's current state, and decides whether a rejected cancel is
//! resubmitted.
//!
//! # Retry Policy
//!
//! A rejected cancel is rebuilt from the ledger and resubmitted while the
//! order is still open, at most `max_retries` times per order. The delay
//! before each resubmission grows exponentially from `initial_backoff`;
//! a zero initial backoff resubmits immediately.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::order_lifecycle::{CancelRequest, OrderError, OrderLedger};
use crate::domain::shared::OrderId;

/// Retry policy for rejected cancels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CancelRetryPolicy {
    /// Maximum resubmissions per order.
    pub max_retries: u32,
    /// Delay before the first resubmission.
    pub initial_backoff: Duration,
    /// Upper bound on any delay.
    pub max_backoff: Duration,
    /// Growth factor between consecutive delays.
    pub backoff_multiplier: f64,
}

impl Default for CancelRetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::from_secs(1),
            backoff_multiplier: 2.0,
        }
    }
}

impl CancelRetryPolicy {
    /// Delay before resubmission number `attempt` (1-based).
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        if self.initial_backoff.is_zero() || attempt == 0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let millis = self.initial_backoff.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let capped = millis.min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}

/// What to do after a cancel reject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Send this request after `delay`.
    Resubmit {
        /// Freshly built cancel request.
        request: CancelRequest,
        /// Resubmission number for this order (1-based).
        attempt: u32,
        /// Delay before sending.
        delay: Duration,
    },
    /// The order has used all its retries.
    Exhausted {
        /// Resubmissions already made.
        attempts: u32,
    },
    /// The order is unknown, terminal or fully filled.
    NothingToCancel,
}

/// Coordinator construction error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CancellationError {
    /// Probability outside `[0, 1]`.
    #[error("cancel probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),

    /// Multiplier below 1.
    #[error("backoff multiplier must be >= 1, got {0}")]
    InvalidMultiplier(f64),
}

/// Owns cancel selection and the per-order retry budget.
#[derive(Debug)]
pub struct CancellationCoordinator {
    ledger: Arc<OrderLedger>,
    probability: f64,
    policy: CancelRetryPolicy,
    retries: Mutex<HashMap<OrderId, u32>>,
}

impl CancellationCoordinator {
    /// Create a coordinator.
    ///
    /// # Errors
    ///
    /// Returns error if `probability` is outside `[0, 1]` or the backoff
    /// multiplier is below 1.
    pub fn new(
        ledger: Arc<OrderLedger>,
        probability: f64,
        policy: CancelRetryPolicy,
    ) -> Result<Self, CancellationError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(CancellationError::InvalidProbability(probability));
        }
        if policy.backoff_multiplier.is_nan() || policy.backoff_multiplier < 1.0 {
            return Err(CancellationError::InvalidMultiplier(policy.backoff_multiplier));
        }
        Ok(Self {
            ledger,
            probability,
            policy,
            retries: Mutex::new(HashMap::new()),
        })
    }

    /// Retry policy in force.
    #[must_use]
    pub const fn policy(&self) -> &CancelRetryPolicy {
        &self.policy
    }

    /// Bernoulli draw: true with the configured probability.
    ///
    /// Always consumes exactly one value from `rng`.
    pub fn should_cancel<R: Rng>(&self, rng: &mut R) -> bool {
        rng.random::<f64>() < self.probability
    }

    /// Mark an order for cancellation.
    ///
    /// # Errors
    ///
    /// Returns error if the order is not in the ledger.
    pub fn mark(&self, id: &OrderId) -> Result<(), OrderError> {
        self.ledger.mark_for_cancellation(id)
    }

    /// Cancel requests for every marked order that still has quantity open,
    /// in marking order.
    #[must_use]
    pub fn cancel_marked(&self) -> Vec<CancelRequest> {
        self.ledger
            .marked_for_cancellation()
            .iter()
            .filter_map(|id| {
                let request = self.ledger.build_cancel_request(id);
                if request.is_none() {
                    tracing::debug!(order_id = %id, "Marked order no longer cancelable");
                }
                request
            })
            .collect()
    }

    /// Decide on a rejected cancel for `orig_cl_ord_id`.
    ///
    /// Consumes one retry from the order's budget when resubmitting.
    pub fn on_cancel_rejected(&self, orig_cl_ord_id: &OrderId) -> RetryDecision {
        let mut retries = self.retries.lock();
        let used = retries.get(orig_cl_ord_id).copied().unwrap_or(0);

        if used >= self.policy.max_retries {
            return RetryDecision::Exhausted { attempts: used };
        }

        let Some(request) = self.ledger.build_cancel_request(orig_cl_ord_id) else {
            return RetryDecision::NothingToCancel;
        };

        let attempt = used + 1;
        retries.insert(orig_cl_ord_id.clone(), attempt);
        RetryDecision::Resubmit {
            request,
            attempt,
            delay: self.policy.backoff_for(attempt),
        }
    }

    /// Resubmissions made so far for an order.
    #[must_use]
    pub fn retries_for(&self, id: &OrderId) -> u32 {
        self.retries.lock().get(id).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_lifecycle::{OrderIntent, OrderSide, OrderStatus};
    use crate::domain::shared::{Quantity, Symbol};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use test_case::test_case;

    fn ledger_with_order(id: &str) -> Arc<OrderLedger> {
        let ledger = Arc::new(OrderLedger::new());
        ledger
            .register(
                OrderId::new(id),
                OrderIntent::market(Symbol::new("XYZ"), OrderSide::Buy, Quantity::from_u64(1000)),
            )
            .unwrap();
        ledger
    }

    fn coordinator(ledger: Arc<OrderLedger>, probability: f64) -> CancellationCoordinator {
        CancellationCoordinator::new(ledger, probability, CancelRetryPolicy::default()).unwrap()
    }

    #[test_case(0.0, 0 ; "never")]
    #[test_case(1.0, 1000 ; "always")]
    fn should_cancel_extremes(probability: f64, expected: usize) {
        let coordinator = coordinator(Arc::new(OrderLedger::new()), probability);
        let mut rng = StdRng::seed_from_u64(5);
        let hits = (0..1000).filter(|_| coordinator.should_cancel(&mut rng)).count();
        assert_eq!(hits, expected);
    }

    #[test]
    fn should_cancel_is_seeded() {
        let coordinator = coordinator(Arc::new(OrderLedger::new()), 0.5);
        let mut a = StdRng::seed_from_u64(9);
        let mut b = StdRng::seed_from_u64(9);
        let first: Vec<bool> = (0..64).map(|_| coordinator.should_cancel(&mut a)).collect();
        let second: Vec<bool> = (0..64).map(|_| coordinator.should_cancel(&mut b)).collect();
        assert_eq!(first, second);
        assert!(first.contains(&true) && first.contains(&false));
    }

    #[test]
    fn new_rejects_bad_probability() {
        let result =
            CancellationCoordinator::new(Arc::new(OrderLedger::new()), 1.5, CancelRetryPolicy::default());
        assert_eq!(result.unwrap_err(), CancellationError::InvalidProbability(1.5));

        let result = CancellationCoordinator::new(
            Arc::new(OrderLedger::new()),
            f64::NAN,
            CancelRetryPolicy::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn cancel_marked_skips_filled_orders() {
        let ledger = ledger_with_order("ORD-1");
        ledger
            .register(
                OrderId::new("ORD-2"),
                OrderIntent::market(Symbol::new("XYZ"), OrderSide::Sell, Quantity::from_u64(1000)),
            )
            .unwrap();
        let coordinator = coordinator(Arc::clone(&ledger), 1.0);

        coordinator.mark(&OrderId::new("ORD-1")).unwrap();
        coordinator.mark(&OrderId::new("ORD-2")).unwrap();
        ledger
            .record_fill(&OrderId::new("ORD-2"), Quantity::from_u64(1000))
            .unwrap();

        let requests = coordinator.cancel_marked();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].orig_cl_ord_id, OrderId::new("ORD-1"));
        assert_eq!(requests[0].quantity, Quantity::from_u64(1000));
    }

    #[test]
    fn mark_unknown_order_fails() {
        let coordinator = coordinator(Arc::new(OrderLedger::new()), 1.0);
        assert!(coordinator.mark(&OrderId::new("ORD-X")).is_err());
    }

    #[test]
    fn reject_resubmits_with_remaining_quantity() {
        let ledger = ledger_with_order("ORD-1");
        ledger
            .record_fill(&OrderId::new("ORD-1"), Quantity::from_u64(400))
            .unwrap();
        let coordinator = coordinator(Arc::clone(&ledger), 1.0);

        match coordinator.on_cancel_rejected(&OrderId::new("ORD-1")) {
            RetryDecision::Resubmit {
                request,
                attempt,
                delay,
            } => {
                assert_eq!(request.quantity, Quantity::from_u64(600));
                assert_eq!(attempt, 1);
                assert_eq!(delay, Duration::ZERO);
            }
            other => panic!("unexpected decision {other:?}"),
        }
    }

    #[test]
    fn retries_are_capped_per_order() {
        let ledger = ledger_with_order("ORD-1");
        let coordinator = coordinator(ledger, 1.0);
        let id = OrderId::new("ORD-1");

        for expected in 1..=3 {
            assert!(matches!(
                coordinator.on_cancel_rejected(&id),
                RetryDecision::Resubmit { attempt, .. } if attempt == expected
            ));
        }
        assert_eq!(
            coordinator.on_cancel_rejected(&id),
            RetryDecision::Exhausted { attempts: 3 }
        );
        assert_eq!(coordinator.retries_for(&id), 3);
    }

    #[test]
    fn reject_for_terminal_order_does_nothing() {
        let ledger = ledger_with_order("ORD-1");
        ledger
            .set_status(&OrderId::new("ORD-1"), OrderStatus::Canceled)
            .unwrap();
        let coordinator = coordinator(ledger, 1.0);

        assert_eq!(
            coordinator.on_cancel_rejected(&OrderId::new("ORD-1")),
            RetryDecision::NothingToCancel
        );
        assert_eq!(coordinator.retries_for(&OrderId::new("ORD-1")), 0);
    }

    #[test]
    fn reject_for_unknown_order_does_nothing() {
        let coordinator = coordinator(Arc::new(OrderLedger::new()), 1.0);
        assert_eq!(
            coordinator.on_cancel_rejected(&OrderId::new("ORD-X")),
            RetryDecision::NothingToCancel
        );
    }

    #[test]
    fn backoff_grows_and_caps() {
        let policy = CancelRetryPolicy {
            max_retries: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(300),
            backoff_multiplier: 2.0,
        };
        assert_eq!(policy.backoff_for(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(300));
        assert_eq!(policy.backoff_for(4), Duration::from_millis(300));
    }

    #[test]
    fn zero_initial_backoff_is_immediate() {
        let policy = CancelRetryPolicy::default();
        assert_eq!(policy.backoff_for(1), Duration::ZERO);
        assert_eq!(policy.backoff_for(3), Duration::ZERO);
    }
}
