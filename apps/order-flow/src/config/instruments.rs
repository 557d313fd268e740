//! Tradable instruments and their LIMIT price bands.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Instruments configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentsConfig {
    /// Symbols drawn uniformly by the generator.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    /// Reference price per symbol; centre of the LIMIT band.
    #[serde(default = "default_reference_prices")]
    pub reference_prices: BTreeMap<String, Decimal>,
    /// Half-width of the LIMIT band.
    #[serde(default = "default_price_band")]
    pub price_band: Decimal,
    /// Decimal places of the price tick.
    #[serde(default = "default_price_decimals")]
    pub price_decimals: u32,
}

impl Default for InstrumentsConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            reference_prices: default_reference_prices(),
            price_band: default_price_band(),
            price_decimals: default_price_decimals(),
        }
    }
}

fn default_symbols() -> Vec<String> {
    vec!["MSFT".to_string(), "AAPL".to_string(), "BAC".to_string()]
}

fn default_reference_prices() -> BTreeMap<String, Decimal> {
    BTreeMap::from([
        ("MSFT".to_string(), dec!(420)),
        ("AAPL".to_string(), dec!(190)),
        ("BAC".to_string(), dec!(35)),
    ])
}

fn default_price_band() -> Decimal {
    dec!(5)
}

const fn default_price_decimals() -> u32 {
    2
}
