//! Configuration structures.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use trading_core::error::{TradingError, TradingResult};
use trading_data::GeneratorConfig;
use trading_monitor::LoggingConfig;
use trading_strategies::StrategySettings;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub market: MarketSettings,
    #[serde(default)]
    pub strategy: StrategySettings,
    #[serde(default)]
    pub trading: TradingSettings,
}

impl AppConfig {
    /// Check every section for out-of-range values.
    pub fn validate(&self) -> TradingResult<()> {
        self.market.validate()?;
        self.strategy.validate()?;
        self.trading.validate()
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "trading-bot".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Synthetic market settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarketSettings {
    pub interval_ms: u64,
    pub volatility: f64,
    pub base_price: f64,
    pub volume_min: f64,
    pub volume_max: f64,
    pub seed: Option<u64>,
    pub stop_timeout_ms: u64,
}

impl Default for MarketSettings {
    fn default() -> Self {
        let defaults = GeneratorConfig::default();
        Self {
            interval_ms: defaults.interval.as_millis() as u64,
            volatility: defaults.volatility,
            base_price: defaults.base_price,
            volume_min: defaults.volume_min,
            volume_max: defaults.volume_max,
            seed: defaults.seed,
            stop_timeout_ms: defaults.stop_timeout.as_millis() as u64,
        }
    }
}

impl MarketSettings {
    fn validate(&self) -> TradingResult<()> {
        if self.interval_ms == 0 {
            return Err(TradingError::Config("market.interval_ms must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.volatility) {
            return Err(TradingError::Config("market.volatility must be in [0, 1)".into()));
        }
        if !(self.base_price.is_finite() && self.base_price > 0.0) {
            return Err(TradingError::Config("market.base_price must be positive".into()));
        }
        if !(self.volume_min > 0.0 && self.volume_min <= self.volume_max && self.volume_max.is_finite())
        {
            return Err(TradingError::Config(
                "market volume range must satisfy 0 < volume_min <= volume_max".into(),
            ));
        }
        Ok(())
    }

    /// Generator configuration for these settings.
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            interval: Duration::from_millis(self.interval_ms),
            volatility: self.volatility,
            base_price: self.base_price,
            volume_min: self.volume_min,
            volume_max: self.volume_max,
            seed: self.seed,
            stop_timeout: Duration::from_millis(self.stop_timeout_ms),
        }
    }
}

/// Paper trading settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TradingSettings {
    /// Starting base currency balance
    pub initial_balance: Decimal,
    /// Asset units per executed decision
    pub trade_size: Decimal,
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            initial_balance: dec!(10000),
            trade_size: dec!(0.1),
        }
    }
}

impl TradingSettings {
    fn validate(&self) -> TradingResult<()> {
        if self.initial_balance <= Decimal::ZERO {
            return Err(TradingError::Config("trading.initial_balance must be positive".into()));
        }
        if self.trade_size <= Decimal::ZERO {
            return Err(TradingError::Config("trading.trade_size must be positive".into()));
        }
        Ok(())
    }
}
