//! In-process simulated venue.
//!
//! Implements [`SessionPort`] against a seeded random venue so runs can be
//! exercised without a FIX counterparty. Reports are delivered on the same
//! [`SessionEvent`] channel a real session engine would use.
//!
//! # Behaviour
//!
//! - Every order is acknowledged.
//! - MARKET orders fill completely near the reference price.
//! - LIMIT orders fill at their limit price with `limit_fill_probability`,
//!   otherwise they rest.
//! - A fill is split in two partial executions with `partial_fill_probability`.
//! - A cancel of a resting order succeeds unless rejected with
//!   `cancel_reject_probability`; a cancel of a filled, canceled or unknown
//!   order is always rejected.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tokio::sync::mpsc;

use crate::application::ports::{
    InboundMessage, NewOrderSingle, OutboundMessage, SessionError, SessionEvent, SessionPort,
};
use crate::config::VenueConfig;
use crate::domain::order_lifecycle::{CancelRequest, OrderSide, OrderStatus, OrderType};
use crate::domain::shared::{OrderId, Price, Quantity, Symbol};

/// Largest distance, in ticks, between a MARKET fill and the reference price.
const MARKET_SLIPPAGE_TICKS: i64 = 100;

/// FIX `OrdStatus` for a rejected order.
const ORD_STATUS_REJECTED: char = '8';

#[derive(Debug)]
struct RestingOrder {
    symbol: Symbol,
    side: OrderSide,
    quantity: Quantity,
    filled: Quantity,
    canceled: bool,
}

impl RestingOrder {
    fn is_open(&self) -> bool {
        !self.canceled && self.filled < self.quantity
    }
}

#[derive(Debug)]
struct VenueState {
    rng: StdRng,
    orders: HashMap<OrderId, RestingOrder>,
    logged_on: bool,
    closed: bool,
}

/// Seeded, in-process venue.
#[derive(Debug)]
pub struct SimulatedVenue {
    config: VenueConfig,
    reference_prices: HashMap<Symbol, Price>,
    price_decimals: u32,
    events: Mutex<Option<mpsc::UnboundedSender<SessionEvent>>>,
    state: Mutex<VenueState>,
}

impl SimulatedVenue {
    /// Create a venue and the event stream it reports on.
    #[must_use]
    pub fn new(
        config: VenueConfig,
        reference_prices: HashMap<Symbol, Price>,
        price_decimals: u32,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = VenueState {
            rng: StdRng::seed_from_u64(config.seed),
            orders: HashMap::new(),
            logged_on: false,
            closed: false,
        };
        let venue = Self {
            config,
            reference_prices,
            price_decimals,
            events: Mutex::new(Some(tx)),
            state: Mutex::new(state),
        };
        (venue, rx)
    }

    /// Complete the logon handshake.
    pub fn logon(&self) {
        {
            let mut state = self.state.lock();
            if state.logged_on || state.closed {
                return;
            }
            state.logged_on = true;
        }
        tracing::info!("Simulated venue logon");
        self.deliver(vec![SessionEvent::LoggedOn]);
    }

    fn latency(&self) -> Duration {
        Duration::from_millis(self.config.latency_ms)
    }

    /// Deliver events in order, after the configured latency.
    fn deliver(&self, events: Vec<SessionEvent>) {
        let Some(tx) = self.events.lock().clone() else {
            return;
        };

        let latency = self.latency();
        if latency.is_zero() {
            for event in events {
                if tx.send(event).is_err() {
                    tracing::debug!("Session event receiver dropped");
                    return;
                }
            }
            return;
        }

        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            for event in events {
                if tx.send(event).is_err() {
                    return;
                }
            }
        });
    }

    fn ensure_logged_on(state: &VenueState) -> Result<(), SessionError> {
        if state.closed {
            Err(SessionError::Closed)
        } else if state.logged_on {
            Ok(())
        } else {
            Err(SessionError::NotLoggedOn)
        }
    }

    fn draw(rng: &mut StdRng, probability: f64) -> bool {
        rng.random::<f64>() < probability
    }

    fn market_price(&self, symbol: &Symbol, rng: &mut StdRng) -> Option<Price> {
        let reference = self.reference_prices.get(symbol)?.amount();
        let scale = Decimal::from(10_i64.pow(self.price_decimals));
        let reference_ticks = (reference * scale).round().to_i64()?;
        let ticks = (reference_ticks + rng.random_range(-MARKET_SLIPPAGE_TICKS..=MARKET_SLIPPAGE_TICKS)).max(1);
        Some(Price::new(Decimal::new(ticks, self.price_decimals)))
    }

    /// Split `quantity` into one or two whole-share executions.
    fn fill_slices(&self, quantity: Quantity, rng: &mut StdRng) -> Vec<Quantity> {
        let whole = quantity.amount().trunc().to_u64().unwrap_or(0);
        if whole >= 2 && Self::draw(rng, self.config.partial_fill_probability) {
            let first = Quantity::from_u64(rng.random_range(1..whole));
            vec![first, quantity.saturating_sub(first)]
        } else {
            vec![quantity]
        }
    }

    fn on_new_order(&self, state: &mut VenueState, order: &NewOrderSingle) -> Vec<SessionEvent> {
        let intent = &order.intent;
        let id = order.cl_ord_id.clone();

        let fill_price = match intent.order_type {
            OrderType::Market => match self.market_price(&intent.symbol, &mut state.rng) {
                Some(price) => Some(price),
                None => {
                    let mut reject = InboundMessage::execution_report(id, ORD_STATUS_REJECTED);
                    reject.text = Some(format!("no market in {}", intent.symbol));
                    return vec![SessionEvent::Application(reject)];
                }
            },
            OrderType::Limit => {
                if Self::draw(&mut state.rng, self.config.limit_fill_probability) {
                    intent.limit_price
                } else {
                    None
                }
            }
        };

        let mut events = vec![SessionEvent::Application(InboundMessage::execution_report(
            id.clone(),
            OrderStatus::New.fix_tag_value(),
        ))];

        let mut resting = RestingOrder {
            symbol: intent.symbol.clone(),
            side: intent.side,
            quantity: intent.quantity,
            filled: Quantity::ZERO,
            canceled: false,
        };

        if let Some(price) = fill_price {
            for slice in self.fill_slices(intent.quantity, &mut state.rng) {
                resting.filled += slice;
                let status = if resting.filled >= resting.quantity {
                    OrderStatus::Filled
                } else {
                    OrderStatus::PartiallyFilled
                };
                events.push(SessionEvent::Application(InboundMessage::fill_report(
                    id.clone(),
                    status.fix_tag_value(),
                    resting.symbol.clone(),
                    resting.side,
                    slice,
                    price,
                )));
            }
        }

        state.orders.insert(id, resting);
        events
    }

    fn on_cancel(&self, state: &mut VenueState, request: &CancelRequest) -> Vec<SessionEvent> {
        let orig_id = request.orig_cl_ord_id.clone();
        let reject_probability = self.config.cancel_reject_probability;

        let reason = match state.orders.get(&orig_id) {
            None => Some("Unknown order"),
            Some(order) if !order.is_open() => Some("Too late to cancel"),
            Some(_) if Self::draw(&mut state.rng, reject_probability) => {
                Some("Cancel pending, try again")
            }
            Some(_) => None,
        };

        let message = match reason {
            Some(text) => InboundMessage::cancel_reject(request.cl_ord_id.clone(), orig_id, text),
            None => {
                if let Some(order) = state.orders.get_mut(&orig_id) {
                    order.canceled = true;
                }
                InboundMessage::execution_report(
                    request.cl_ord_id.clone(),
                    OrderStatus::Canceled.fix_tag_value(),
                )
                .with_orig_cl_ord_id(orig_id)
            }
        };
        vec![SessionEvent::Application(message)]
    }
}

#[async_trait]
impl SessionPort for SimulatedVenue {
    async fn send(&self, message: OutboundMessage) -> Result<(), SessionError> {
        let events = {
            let mut state = self.state.lock();
            Self::ensure_logged_on(&state)?;
            match &message {
                OutboundMessage::NewOrder(order) => self.on_new_order(&mut state, order),
                OutboundMessage::Cancel(request) => self.on_cancel(&mut state, request),
            }
        };
        self.deliver(events);
        Ok(())
    }

    async fn close(&self) {
        {
            let mut state = self.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            state.logged_on = false;
        }
        tracing::info!("Simulated venue logout");
        self.deliver(vec![SessionEvent::LoggedOut]);
        // Dropping the sender ends the stream once queued events drain.
        self.events.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_lifecycle::OrderIntent;
    use rust_decimal_macros::dec;

    fn venue(config: VenueConfig) -> (SimulatedVenue, mpsc::UnboundedReceiver<SessionEvent>) {
        SimulatedVenue::new(
            config,
            HashMap::from([(Symbol::new("XYZ"), Price::new(dec!(100)))]),
            2,
        )
    }

    fn always_fill() -> VenueConfig {
        VenueConfig {
            seed: 1,
            latency_ms: 0,
            partial_fill_probability: 0.0,
            limit_fill_probability: 1.0,
            cancel_reject_probability: 0.0,
        }
    }

    fn never_fill() -> VenueConfig {
        VenueConfig {
            limit_fill_probability: 0.0,
            ..always_fill()
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn new_order(id: &str, intent: OrderIntent) -> OutboundMessage {
        OutboundMessage::NewOrder(NewOrderSingle {
            cl_ord_id: OrderId::new(id),
            intent,
        })
    }

    fn limit(side: OrderSide) -> OrderIntent {
        OrderIntent::limit(
            Symbol::new("XYZ"),
            side,
            Quantity::from_u64(1000),
            Price::new(dec!(99.5)),
        )
    }

    fn cancel(id: &str, orig: &str) -> OutboundMessage {
        OutboundMessage::Cancel(CancelRequest {
            cl_ord_id: OrderId::new(id),
            orig_cl_ord_id: OrderId::new(orig),
            symbol: Symbol::new("XYZ"),
            side: OrderSide::Buy,
            quantity: Quantity::from_u64(1000),
        })
    }

    fn statuses(events: &[SessionEvent]) -> Vec<Option<char>> {
        events
            .iter()
            .filter_map(|event| match event {
                SessionEvent::Application(message) => Some(message.ord_status),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn send_before_logon_fails() {
        let (venue, _rx) = venue(always_fill());
        let result = venue.send(new_order("ORD-1", limit(OrderSide::Buy))).await;
        assert_eq!(result, Err(SessionError::NotLoggedOn));
    }

    #[tokio::test]
    async fn logon_delivers_logged_on_once() {
        let (venue, mut rx) = venue(always_fill());
        venue.logon();
        venue.logon();
        assert_eq!(drain(&mut rx), vec![SessionEvent::LoggedOn]);
    }

    #[tokio::test]
    async fn limit_order_acked_and_filled_at_limit() {
        let (venue, mut rx) = venue(always_fill());
        venue.logon();
        drain(&mut rx);

        venue.send(new_order("ORD-1", limit(OrderSide::Sell))).await.unwrap();
        let events = drain(&mut rx);

        assert_eq!(statuses(&events), vec![Some('0'), Some('2')]);
        match &events[1] {
            SessionEvent::Application(message) => {
                assert_eq!(message.last_px, Some(Price::new(dec!(99.5))));
                assert_eq!(message.last_qty, Some(Quantity::from_u64(1000)));
                assert_eq!(message.side, Some(OrderSide::Sell));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn partial_fills_sum_to_quantity() {
        let (venue, mut rx) = venue(VenueConfig {
            partial_fill_probability: 1.0,
            ..always_fill()
        });
        venue.logon();
        drain(&mut rx);

        venue
            .send(new_order(
                "ORD-1",
                OrderIntent::market(Symbol::new("XYZ"), OrderSide::Buy, Quantity::from_u64(1000)),
            ))
            .await
            .unwrap();
        let events = drain(&mut rx);

        assert_eq!(statuses(&events), vec![Some('0'), Some('1'), Some('2')]);
        let total = events
            .iter()
            .filter_map(|event| match event {
                SessionEvent::Application(message) => message.last_qty,
                _ => None,
            })
            .fold(Quantity::ZERO, |acc, qty| acc + qty);
        assert_eq!(total, Quantity::from_u64(1000));
    }

    #[tokio::test]
    async fn market_fill_price_near_reference() {
        let (venue, mut rx) = venue(always_fill());
        venue.logon();
        drain(&mut rx);

        venue
            .send(new_order(
                "ORD-1",
                OrderIntent::market(Symbol::new("XYZ"), OrderSide::Buy, Quantity::from_u64(10)),
            ))
            .await
            .unwrap();
        let events = drain(&mut rx);
        let SessionEvent::Application(fill) = &events[1] else {
            panic!("expected fill report");
        };
        let price = fill.last_px.unwrap().amount();
        assert!(price >= dec!(99) && price <= dec!(101));
    }

    #[tokio::test]
    async fn market_order_without_reference_is_rejected() {
        let (venue, mut rx) = venue(always_fill());
        venue.logon();
        drain(&mut rx);

        venue
            .send(new_order(
                "ORD-1",
                OrderIntent::market(Symbol::new("NOPE"), OrderSide::Buy, Quantity::from_u64(10)),
            ))
            .await
            .unwrap();
        assert_eq!(statuses(&drain(&mut rx)), vec![Some('8')]);
    }

    #[tokio::test]
    async fn cancel_resting_order_succeeds() {
        let (venue, mut rx) = venue(never_fill());
        venue.logon();
        venue.send(new_order("ORD-1", limit(OrderSide::Buy))).await.unwrap();
        drain(&mut rx);

        venue.send(cancel("CXL-1", "ORD-1")).await.unwrap();
        let events = drain(&mut rx);
        let SessionEvent::Application(message) = &events[0] else {
            panic!("expected cancel confirmation");
        };
        assert_eq!(message.ord_status, Some('4'));
        assert_eq!(message.orig_cl_ord_id, Some(OrderId::new("ORD-1")));

        // Second cancel of the same order is too late.
        venue.send(cancel("CXL-2", "ORD-1")).await.unwrap();
        let events = drain(&mut rx);
        let SessionEvent::Application(message) = &events[0] else {
            panic!("expected cancel reject");
        };
        assert_eq!(message.msg_type, crate::application::ports::MsgType::OrderCancelReject);
    }

    #[tokio::test]
    async fn cancel_of_filled_order_is_rejected() {
        let (venue, mut rx) = venue(always_fill());
        venue.logon();
        venue.send(new_order("ORD-1", limit(OrderSide::Buy))).await.unwrap();
        drain(&mut rx);

        venue.send(cancel("CXL-1", "ORD-1")).await.unwrap();
        let events = drain(&mut rx);
        let SessionEvent::Application(message) = &events[0] else {
            panic!("expected cancel reject");
        };
        assert_eq!(message.text.as_deref(), Some("Too late to cancel"));
    }

    #[tokio::test]
    async fn close_sends_logout_and_ends_stream() {
        let (venue, mut rx) = venue(always_fill());
        venue.logon();
        venue.close().await;
        venue.close().await;

        assert_eq!(rx.recv().await, Some(SessionEvent::LoggedOn));
        assert_eq!(rx.recv().await, Some(SessionEvent::LoggedOut));
        assert_eq!(rx.recv().await, None);

        let result = venue.send(cancel("CXL-1", "ORD-1")).await;
        assert_eq!(result, Err(SessionError::Closed));
    }

    #[tokio::test]
    async fn same_seed_same_reports() {
        let config = VenueConfig {
            partial_fill_probability: 0.5,
            limit_fill_probability: 0.5,
            ..always_fill()
        };
        let mut runs = Vec::new();
        for _ in 0..2 {
            let (venue, mut rx) = venue(config.clone());
            venue.logon();
            for i in 0..20 {
                venue
                    .send(new_order(&format!("ORD-{i}"), limit(OrderSide::Buy)))
                    .await
                    .unwrap();
            }
            runs.push(drain(&mut rx));
        }
        assert_eq!(runs[0], runs[1]);
    }
}
