//! RSI-based decision engine.
//!
//! Buys while RSI sits below the oversold level and sells while it sits
//! above the overbought level. Holds during warm-up and in between.

use serde::{Deserialize, Serialize};
use tracing::debug;
use trading_core::{
    error::StrategyError,
    traits::{DecisionEngine, EngineConfig, EngineState, Indicator},
    types::{Bar, Decision, PriceHistory},
};
use trading_indicators::Rsi;

/// Configuration for the RSI engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiConfig {
    /// RSI calculation period
    pub period: usize,
    /// Oversold threshold (buy below this)
    pub oversold: f64,
    /// Overbought threshold (sell above this)
    pub overbought: f64,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl EngineConfig for RsiConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.period < 2 {
            return Err(StrategyError::InvalidConfig(
                "RSI period must be at least 2".into(),
            ));
        }
        if self.overbought <= self.oversold {
            return Err(StrategyError::InvalidConfig(
                "Overbought must be greater than oversold".into(),
            ));
        }
        if self.overbought > 100.0 || self.oversold < 0.0 {
            return Err(StrategyError::InvalidConfig(
                "RSI thresholds must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}

/// RSI-based decision engine.
pub struct RsiEngine {
    config: RsiConfig,
    rsi: Rsi,
    history: PriceHistory,
    last_rsi: Option<f64>,
    bars_processed: usize,
    signals_generated: usize,
}

impl RsiEngine {
    /// Create a new RSI engine.
    pub fn new(config: RsiConfig) -> Self {
        let rsi = Rsi::new(config.period);
        let history = PriceHistory::with_capacity(config.period + 1);
        Self {
            config,
            rsi,
            history,
            last_rsi: None,
            bars_processed: 0,
            signals_generated: 0,
        }
    }

    /// Most recent RSI value, `None` during warm-up.
    pub fn last_rsi(&self) -> Option<f64> {
        self.last_rsi
    }

    fn classify(&self, rsi: f64) -> Decision {
        if rsi < self.config.oversold {
            Decision::Buy
        } else if rsi > self.config.overbought {
            Decision::Sell
        } else {
            Decision::Hold
        }
    }
}

impl DecisionEngine for RsiEngine {
    fn name(&self) -> &str {
        "RSI Strategy"
    }

    fn decide(&mut self, bar: &Bar) -> Decision {
        self.bars_processed += 1;
        self.history.push(bar.close);

        if self.history.len() < self.warmup_period() {
            debug!(
                collected = self.history.len(),
                required = self.warmup_period(),
                "RSI engine waiting for more data"
            );
            return Decision::Hold;
        }

        let Some(rsi) = self.rsi.latest(&self.history.closes()) else {
            return Decision::Hold;
        };
        self.last_rsi = Some(rsi);

        let decision = self.classify(rsi);
        if decision.is_actionable() {
            self.signals_generated += 1;
        }
        debug!(
            rsi,
            oversold = self.config.oversold,
            overbought = self.config.overbought,
            %decision,
            "RSI calculated"
        );
        decision
    }

    fn reset(&mut self) {
        self.history.clear();
        self.last_rsi = None;
        self.bars_processed = 0;
        self.signals_generated = 0;
    }

    fn state(&self) -> EngineState {
        let mut indicators = std::collections::HashMap::new();
        if let Some(rsi) = self.last_rsi {
            indicators.insert("rsi".to_string(), rsi);
        }
        EngineState {
            name: self.name().to_string(),
            is_warmed_up: self.is_warmed_up(self.history.len()),
            bars_processed: self.bars_processed,
            signals_generated: self.signals_generated,
            indicators,
        }
    }

    fn warmup_period(&self) -> usize {
        self.config.period + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar_at(i: usize, close: f64) -> Bar {
        Bar::new(i as i64 * 1000, close, close + 100.0, close - 100.0, close, 1000.0)
    }

    fn feed(engine: &mut RsiEngine, closes: &[f64]) -> Vec<Decision> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| engine.decide(&bar_at(i, close)))
            .collect()
    }

    #[test]
    fn test_config_validation() {
        let mut config = RsiConfig::default();
        assert!(config.validate().is_ok());

        config.overbought = 30.0;
        config.oversold = 70.0;
        assert!(config.validate().is_err());

        let config = RsiConfig {
            period: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RsiConfig {
            overbought: 120.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_holds_during_warmup() {
        let mut engine = RsiEngine::new(RsiConfig::default());
        let closes: Vec<f64> = (0..10).map(|i| 50000.0 - 100.0 * i as f64).collect();

        let decisions = feed(&mut engine, &closes);
        assert!(decisions.iter().all(|d| *d == Decision::Hold));
        assert!(engine.last_rsi().is_none());
        assert!(!engine.state().is_warmed_up);
    }

    #[test]
    fn test_monotonic_decline_buys() {
        let mut engine = RsiEngine::new(RsiConfig::default());
        let closes: Vec<f64> = (0..15).map(|i| 50000.0 - 100.0 * i as f64).collect();

        let decisions = feed(&mut engine, &closes);
        assert!(decisions[..14].iter().all(|d| *d == Decision::Hold));
        assert_eq!(decisions[14], Decision::Buy);
        assert_eq!(engine.last_rsi(), Some(0.0));
    }

    #[test]
    fn test_monotonic_rise_sells() {
        let mut engine = RsiEngine::new(RsiConfig::default());
        let closes: Vec<f64> = (0..15).map(|i| 50000.0 + 100.0 * i as f64).collect();

        let decisions = feed(&mut engine, &closes);
        assert_eq!(decisions[14], Decision::Sell);
        assert_eq!(engine.last_rsi(), Some(100.0));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut engine = RsiEngine::new(RsiConfig::default());
        // A long rise followed by 14 declines: only the last 15 closes count
        let mut closes: Vec<f64> = (0..30).map(|i| 40000.0 + 100.0 * i as f64).collect();
        let top = *closes.last().unwrap();
        closes.extend((1..=14).map(|i| top - 100.0 * i as f64));

        let decisions = feed(&mut engine, &closes);
        assert_eq!(*decisions.last().unwrap(), Decision::Buy);
        assert_eq!(engine.history.len(), 15);
    }

    #[test]
    fn test_neutral_rsi_holds() {
        let mut engine = RsiEngine::new(RsiConfig {
            period: 4,
            ..Default::default()
        });

        let decisions = feed(&mut engine, &[100.0, 102.0, 100.0, 102.0, 100.0]);
        assert_eq!(decisions[4], Decision::Hold);
        assert!((engine.last_rsi().unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_state_and_reset() {
        let mut engine = RsiEngine::new(RsiConfig {
            period: 2,
            ..Default::default()
        });

        feed(&mut engine, &[100.0, 99.0, 98.0]);
        let state = engine.state();
        assert_eq!(state.bars_processed, 3);
        assert_eq!(state.signals_generated, 1);
        assert!(state.is_warmed_up);
        assert_eq!(state.indicators.get("rsi"), Some(&0.0));

        engine.reset();
        assert!(engine.last_rsi().is_none());
        assert_eq!(engine.state().bars_processed, 0);
        assert!(engine.history.is_empty());
    }
}
