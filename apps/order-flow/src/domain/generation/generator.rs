//! Seeded random order generator.
//!
//! Same config + same random stream ⇒ same sequence of intents. Each intent
//! draws, in order: order type, symbol, side, and for LIMIT orders a price
//! uniform over the tick grid inside `[reference - band, reference + band]`.

use std::collections::HashMap;

use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::domain::order_lifecycle::{OrderIntent, OrderSide, OrderType};
use crate::domain::shared::{Price, Quantity, Symbol};

/// Errors raised while generating an order intent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// No tradable symbols configured.
    #[error("no tradable symbols configured")]
    NoSymbols,

    /// Order quantity is not positive.
    #[error("order quantity must be positive, got {0}")]
    InvalidQuantity(Quantity),

    /// LIMIT intent for a symbol with no reference price.
    #[error("no reference price for {symbol}; cannot price a LIMIT order")]
    MissingReferencePrice {
        /// Symbol drawn.
        symbol: Symbol,
    },

    /// The price band contains no valid positive tick.
    #[error("invalid price band for {symbol}: {message}")]
    InvalidPriceBand {
        /// Symbol drawn.
        symbol: Symbol,
        /// Details.
        message: String,
    },
}

/// Generator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Tradable symbols, drawn uniformly.
    pub symbols: Vec<Symbol>,
    /// Reference price per symbol (centre of the LIMIT price band).
    pub reference_prices: HashMap<Symbol, Price>,
    /// Half-width of the LIMIT price band.
    pub price_band: Decimal,
    /// Fixed quantity for every order.
    pub order_quantity: Quantity,
    /// Decimal places of the price tick.
    pub price_decimals: u32,
}

/// Produces synthetic order intents from an injected random stream.
#[derive(Debug, Clone)]
pub struct RandomOrderGenerator {
    config: GeneratorConfig,
}

impl RandomOrderGenerator {
    /// Create a generator.
    ///
    /// # Errors
    ///
    /// Returns error if no symbols are configured or the quantity is not positive.
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerationError> {
        if config.symbols.is_empty() {
            return Err(GenerationError::NoSymbols);
        }
        if !config.order_quantity.is_positive() {
            return Err(GenerationError::InvalidQuantity(config.order_quantity));
        }
        Ok(Self { config })
    }

    /// Generator settings.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Draw the next order intent.
    ///
    /// # Errors
    ///
    /// Returns error if a LIMIT order is drawn for a symbol whose reference
    /// price is missing or whose band holds no positive tick.
    pub fn next<R: Rng>(&self, rng: &mut R) -> Result<OrderIntent, GenerationError> {
        let order_type = OrderType::ALL[rng.random_range(0..OrderType::ALL.len())];
        let symbol = self.config.symbols[rng.random_range(0..self.config.symbols.len())].clone();
        let side = OrderSide::ALL[rng.random_range(0..OrderSide::ALL.len())];
        let quantity = self.config.order_quantity;

        match order_type {
            OrderType::Market => Ok(OrderIntent::market(symbol, side, quantity)),
            OrderType::Limit => {
                let price = self.draw_limit_price(&symbol, rng)?;
                Ok(OrderIntent::limit(symbol, side, quantity, price))
            }
        }
    }

    /// Uniform price over the tick grid inside the symbol's band.
    fn draw_limit_price<R: Rng>(
        &self,
        symbol: &Symbol,
        rng: &mut R,
    ) -> Result<Price, GenerationError> {
        let reference = self
            .config
            .reference_prices
            .get(symbol)
            .ok_or_else(|| GenerationError::MissingReferencePrice {
                symbol: symbol.clone(),
            })?
            .amount();

        let (low, high) = self.tick_bounds(symbol, reference)?;
        let ticks = rng.random_range(low..=high);
        Ok(Price::new(Decimal::new(ticks, self.config.price_decimals)))
    }

    /// Inclusive tick range `[ceil(low), floor(high)]`, restricted to positive prices.
    fn tick_bounds(&self, symbol: &Symbol, reference: Decimal) -> Result<(i64, i64), GenerationError> {
        let band_error = |message: String| GenerationError::InvalidPriceBand {
            symbol: symbol.clone(),
            message,
        };

        let scale = Decimal::from(10_i64.pow(self.config.price_decimals));
        let low = ((reference - self.config.price_band) * scale)
            .ceil()
            .max(Decimal::ONE)
            .to_i64()
            .ok_or_else(|| band_error("lower bound out of range".to_string()))?;
        let high = ((reference + self.config.price_band) * scale)
            .floor()
            .to_i64()
            .ok_or_else(|| band_error("upper bound out of range".to_string()))?;

        if low > high {
            return Err(band_error(format!(
                "reference {reference} ± {} holds no positive tick",
                self.config.price_band
            )));
        }
        Ok((low, high))
    }
}
