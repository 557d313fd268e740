//! Trade Statistics Integration Tests
//!
//! Worked examples and property checks over the statistics engine.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use order_flow::{OrderSide, Price, Quantity, Symbol, TradeStatsEngine, Transaction};

fn fill(symbol: &str, side: OrderSide, qty: u64, price: Decimal) -> Transaction {
    Transaction::new(
        Symbol::new(symbol),
        side,
        Quantity::from_u64(qty),
        Price::new(price),
    )
    .unwrap()
}

#[test]
fn buy_then_sell_worked_example() {
    let engine = TradeStatsEngine::new(vec![Symbol::new("XYZ")]);
    engine.process(&fill("XYZ", OrderSide::Buy, 100, dec!(50))).unwrap();
    engine.process(&fill("XYZ", OrderSide::Sell, 40, dec!(60))).unwrap();

    let summary = engine.summarize();
    let xyz = &summary.instruments[&Symbol::new("XYZ")];

    assert_eq!(summary.balance, dec!(-2600));
    assert_eq!(summary.total_volume, Quantity::from_u64(140));
    assert_eq!(xyz.inventory, dec!(60));
    assert_eq!(xyz.vwap.round_dp(2), dec!(52.86));
    assert_eq!(summary.pnl.round_dp(2), dec!(571.43));
}

#[test]
fn configured_instrument_without_fills_reported_as_zero() {
    let engine = TradeStatsEngine::new(vec![Symbol::new("XYZ"), Symbol::new("IDLE")]);
    engine.process(&fill("XYZ", OrderSide::Buy, 10, dec!(20))).unwrap();

    let summary = engine.summarize();
    let idle = &summary.instruments[&Symbol::new("IDLE")];

    assert_eq!(idle.vwap, Decimal::ZERO);
    assert_eq!(idle.inventory, Decimal::ZERO);
    assert_eq!(idle.traded_volume, Decimal::ZERO);
}

#[test]
fn summarize_is_repeatable() {
    let engine = TradeStatsEngine::new(vec![Symbol::new("XYZ")]);
    engine.process(&fill("XYZ", OrderSide::Sell, 7, dec!(13.37))).unwrap();

    assert_eq!(engine.summarize(), engine.summarize());
}

fn arb_fill() -> impl Strategy<Value = (OrderSide, usize, u64, i64)> {
    (
        prop::sample::select(OrderSide::ALL.to_vec()),
        0..3_usize,
        1..5_000_u64,
        1..1_000_000_i64,
    )
}

const SYMBOLS: [&str; 3] = ["AAA", "BBB", "CCC"];

proptest! {
    #[test]
    fn balance_and_inventory_follow_side_signs(fills in prop::collection::vec(arb_fill(), 0..60)) {
        let engine = TradeStatsEngine::new(SYMBOLS.iter().map(|s| Symbol::new(*s)).collect());
        let mut expected_balance = Decimal::ZERO;
        let mut expected_inventory = [Decimal::ZERO; 3];
        let mut expected_volume = Decimal::ZERO;

        for (side, idx, qty, cents) in &fills {
            let price = Decimal::new(*cents, 2);
            let qty_dec = Decimal::from(*qty);
            engine.process(&fill(SYMBOLS[*idx], *side, *qty, price)).unwrap();

            if side.is_buy() {
                expected_balance -= price * qty_dec;
                expected_inventory[*idx] += qty_dec;
            } else {
                expected_balance += price * qty_dec;
                expected_inventory[*idx] -= qty_dec;
            }
            expected_volume += qty_dec;
        }

        let summary = engine.summarize();
        prop_assert_eq!(summary.balance, expected_balance);
        prop_assert_eq!(summary.total_volume.amount(), expected_volume);
        prop_assert_eq!(summary.pnl, summary.balance + summary.value_of_inventories);
        for (idx, symbol) in SYMBOLS.iter().enumerate() {
            let line = &summary.instruments[&Symbol::new(*symbol)];
            prop_assert_eq!(line.inventory, expected_inventory[idx]);
            if line.traded_volume.is_zero() {
                prop_assert_eq!(line.vwap, Decimal::ZERO);
                prop_assert_eq!(line.inventory, Decimal::ZERO);
            }
        }
    }

    #[test]
    fn vwap_stays_within_fill_prices(prices in prop::collection::vec((1..1_000_000_i64, 1..1_000_u64), 1..40)) {
        let engine = TradeStatsEngine::new(vec![Symbol::new("XYZ")]);
        for (cents, qty) in &prices {
            engine
                .process(&fill("XYZ", OrderSide::Buy, *qty, Decimal::new(*cents, 2)))
                .unwrap();
        }

        let lowest = prices.iter().map(|(c, _)| *c).min().unwrap();
        let highest = prices.iter().map(|(c, _)| *c).max().unwrap();
        let vwap = engine.vwap(&Symbol::new("XYZ"));

        // Division may round in the last place.
        let tolerance = dec!(0.000001);
        prop_assert!(vwap >= Decimal::new(lowest, 2) - tolerance);
        prop_assert!(vwap <= Decimal::new(highest, 2) + tolerance);
    }
}
