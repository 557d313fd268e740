//! Configuration module for the order flow generator.
//!
//! YAML configuration with environment variable interpolation and
//! validation. Every section has defaults, so an empty file (or no file)
//! is a valid configuration.
//!
//! # Usage
//!
//! ```rust,ignore
//! use order_flow::config::load_config_or_default;
//!
//! let config = load_config_or_default("order-flow.yaml")?;
//! println!("orders: {}", config.run.num_orders);
//! ```

mod cancellation;
mod instruments;
mod observability;
mod run;
mod venue;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cancellation::CancellationConfig;
pub use instruments::InstrumentsConfig;
pub use observability::{LoggingConfig, MetricsSettings, ObservabilityConfig};
pub use run::RunConfig;
pub use venue::VenueConfig;

use crate::application::use_cases::RunSettings;
use crate::domain::generation::GeneratorConfig;
use crate::domain::shared::{Price, Quantity, Symbol};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "ORDER_FLOW_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "order-flow.yaml";

/// Maximum supported price tick decimals.
const MAX_PRICE_DECIMALS: u32 = 8;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Run configuration.
    #[serde(default)]
    pub run: RunConfig,
    /// Instruments and price bands.
    #[serde(default)]
    pub instruments: InstrumentsConfig,
    /// Cancel selection and retry.
    #[serde(default)]
    pub cancellation: CancellationConfig,
    /// Simulated venue.
    #[serde(default)]
    pub venue: VenueConfig,
    /// Logging and metrics.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Configured symbols, in configuration order.
    #[must_use]
    pub fn symbols(&self) -> Vec<Symbol> {
        self.instruments.symbols.iter().map(Symbol::new).collect()
    }

    /// Reference price per symbol.
    #[must_use]
    pub fn reference_prices(&self) -> HashMap<Symbol, Price> {
        self.instruments
            .reference_prices
            .iter()
            .map(|(symbol, price)| (Symbol::new(symbol), Price::new(*price)))
            .collect()
    }

    /// Generator settings.
    #[must_use]
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            symbols: self.symbols(),
            reference_prices: self.reference_prices(),
            price_band: self.instruments.price_band,
            order_quantity: Quantity::from_u64(self.run.order_quantity),
            price_decimals: self.instruments.price_decimals,
        }
    }

    /// Run settings.
    #[must_use]
    pub const fn run_settings(&self) -> RunSettings {
        RunSettings {
            num_orders: self.run.num_orders,
            seed: self.run.seed,
            drain: self.run.drain(),
            logon_timeout: self.run.logon_timeout(),
        }
    }

    /// Metrics listen address, when the exporter is enabled.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter is enabled with an unparseable address.
    pub fn metrics_addr(&self) -> Result<Option<SocketAddr>, ConfigError> {
        let metrics = &self.observability.metrics;
        if !metrics.enabled {
            return Ok(None);
        }
        metrics.listen_addr.parse().map(Some).map_err(|_| {
            ConfigError::ValidationError(format!(
                "observability.metrics.listen_addr '{}' is not a socket address",
                metrics.listen_addr
            ))
        })
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;
    load_config_from_string(&contents)
}

/// Load configuration from `path`, or the defaults if no such file exists.
///
/// # Errors
///
/// Returns a `ConfigError` if the file exists but cannot be read, parsed,
/// or validated.
pub fn load_config_or_default(path: &str) -> Result<Config, ConfigError> {
    if Path::new(path).exists() {
        return load_config(path);
    }

    tracing::info!(path, "Config file not found, using defaults");
    let config = Config::default();
    validate_config(&config)?;
    Ok(config)
}

/// Config path from [`CONFIG_PATH_ENV`], falling back to [`DEFAULT_CONFIG_PATH`].
#[must_use]
pub fn config_path_from_env() -> String {
    std::env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|path| !path.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    // An empty document deserializes as unit, not as an empty map.
    let config: Config = if interpolated.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml_bw::from_str(&interpolated)?
    };
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

fn check_probability(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be between 0.0 and 1.0, got {value}")))
    }
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.run.order_quantity == 0 {
        return Err(invalid("run.order_quantity must be positive"));
    }

    let instruments = &config.instruments;
    if instruments.symbols.is_empty() {
        return Err(invalid("instruments.symbols must not be empty"));
    }
    for symbol in &instruments.symbols {
        match instruments.reference_prices.get(symbol) {
            Some(price) if *price > Decimal::ZERO => {}
            Some(price) => {
                return Err(invalid(format!(
                    "instruments.reference_prices.{symbol} must be positive, got {price}"
                )));
            }
            None => {
                return Err(invalid(format!(
                    "instruments.reference_prices has no entry for {symbol}"
                )));
            }
        }
    }
    if instruments.price_band < Decimal::ZERO {
        return Err(invalid("instruments.price_band must not be negative"));
    }
    if instruments.price_decimals > MAX_PRICE_DECIMALS {
        return Err(invalid(format!(
            "instruments.price_decimals must be at most {MAX_PRICE_DECIMALS}"
        )));
    }

    let cancellation = &config.cancellation;
    check_probability("cancellation.probability", cancellation.probability)?;
    if cancellation.backoff_multiplier.is_nan() || cancellation.backoff_multiplier < 1.0 {
        return Err(invalid("cancellation.backoff_multiplier must be at least 1.0"));
    }
    if cancellation.max_backoff_ms < cancellation.initial_backoff_ms {
        return Err(invalid(
            "cancellation.max_backoff_ms must not be below initial_backoff_ms",
        ));
    }

    let venue = &config.venue;
    check_probability("venue.partial_fill_probability", venue.partial_fill_probability)?;
    check_probability("venue.limit_fill_probability", venue.limit_fill_probability)?;
    check_probability("venue.cancel_reject_probability", venue.cancel_reject_probability)?;

    config.metrics_addr()?;
    Ok(())
}
