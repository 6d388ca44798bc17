//! Model-based decision engine.
//!
//! The engine turns its close history into a small feature vector and asks an
//! external [`Predictor`] (an inference backend, a remote service) for a
//! prediction. Mapping predictions to decisions, and refusing to emit SELL
//! while nothing is held, stays in the engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};
use trading_broker::PaperAccount;
use trading_core::{
    error::StrategyError,
    traits::{DecisionEngine, EngineConfig, EngineState, Indicator},
    types::{Bar, Decision, PriceHistory},
};
use trading_indicators::{Momentum, Rsi, Sma};

/// Neutral RSI reported while the history is too short.
const NEUTRAL_RSI: f64 = 50.0;

/// Features handed to the predictor for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelFeatures {
    /// RSI over the configured period
    pub rsi: f64,
    /// Close minus its simple moving average
    pub sma_diff: f64,
    /// Close minus the close `momentum_period` bars earlier
    pub momentum: f64,
}

impl ModelFeatures {
    /// Feature vector in model input order: `[rsi, sma_diff, momentum]`.
    pub fn to_array(&self) -> [f32; 3] {
        [self.rsi as f32, self.sma_diff as f32, self.momentum as f32]
    }
}

/// Raw output of a predictor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Prediction {
    /// Classifier label: 1 = BUY, 0 = SELL.
    ClassIndex(i64),
    /// Score in `[0, 1]`; above 0.5 leans BUY.
    Probability(f32),
}

/// External prediction backend.
///
/// Implementations wrap whatever runs the model. Failures are returned as
/// errors; the engine turns them into HOLD.
pub trait Predictor: Send + Sync {
    /// Name of the backend, for logs.
    fn name(&self) -> &str;

    /// Predict from one feature vector.
    fn predict(&self, features: &ModelFeatures) -> Result<Prediction, StrategyError>;
}

/// Configuration for the model engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// RSI feature period
    pub rsi_period: usize,
    /// SMA feature period
    pub sma_period: usize,
    /// Momentum feature period
    pub momentum_period: usize,
    /// Minimum distance from 0.5 for a probability to count as a signal
    pub confidence_threshold: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            sma_period: 20,
            momentum_period: 5,
            confidence_threshold: 0.3,
        }
    }
}

impl ModelConfig {
    /// Closes the engine must keep to compute every feature.
    pub fn history_capacity(&self) -> usize {
        self.rsi_period.max(self.sma_period).max(self.momentum_period) + 1
    }
}

impl EngineConfig for ModelConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.rsi_period < 2 {
            return Err(StrategyError::InvalidConfig(
                "Model RSI period must be at least 2".into(),
            ));
        }
        if self.sma_period == 0 || self.momentum_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "Model SMA and momentum periods must be positive".into(),
            ));
        }
        if !(0.0..=0.5).contains(&self.confidence_threshold) {
            return Err(StrategyError::InvalidConfig(
                "Confidence threshold must be between 0 and 0.5".into(),
            ));
        }
        Ok(())
    }
}

/// Decision engine backed by an external predictor.
pub struct ModelEngine {
    config: ModelConfig,
    predictor: Arc<dyn Predictor>,
    account: PaperAccount,
    history: PriceHistory,
    rsi: Rsi,
    sma: Sma,
    momentum: Momentum,
    last_features: Option<ModelFeatures>,
    bars_processed: usize,
    signals_generated: usize,
}

impl ModelEngine {
    /// Create a model engine.
    ///
    /// `account` is only read, to avoid emitting SELL with nothing to sell.
    pub fn new(config: ModelConfig, predictor: Arc<dyn Predictor>, account: PaperAccount) -> Self {
        Self {
            history: PriceHistory::with_capacity(config.history_capacity()),
            rsi: Rsi::new(config.rsi_period),
            sma: Sma::new(config.sma_period),
            momentum: Momentum::new(config.momentum_period),
            config,
            predictor,
            account,
            last_features: None,
            bars_processed: 0,
            signals_generated: 0,
        }
    }

    /// Features computed for the most recent bar.
    pub fn last_features(&self) -> Option<ModelFeatures> {
        self.last_features
    }

    fn extract_features(&mut self, bar: &Bar) -> ModelFeatures {
        self.history.push(bar.close);
        let closes = self.history.closes();

        let rsi = self.rsi.latest(&closes).unwrap_or(NEUTRAL_RSI);
        let sma_diff = self.sma.distance(&closes).unwrap_or(0.0);
        let momentum = self.momentum.latest(&closes).unwrap_or(0.0);

        ModelFeatures {
            rsi,
            sma_diff,
            momentum,
        }
    }

    /// SELL is downgraded to HOLD while no asset is held.
    fn guard_sell(&self) -> Decision {
        if self.account.has_assets() {
            Decision::Sell
        } else {
            Decision::Hold
        }
    }

    fn map_prediction(&self, prediction: Prediction) -> Decision {
        match prediction {
            Prediction::ClassIndex(class) => {
                if class >= 1 {
                    Decision::Buy
                } else {
                    self.guard_sell()
                }
            }
            Prediction::Probability(p) => {
                let p = f64::from(p);
                if !p.is_finite() {
                    warn!(predictor = self.predictor.name(), "Non-finite prediction, holding");
                    return Decision::Hold;
                }
                if (p - 0.5).abs() < self.config.confidence_threshold {
                    Decision::Hold
                } else if p >= 0.5 {
                    Decision::Buy
                } else {
                    self.guard_sell()
                }
            }
        }
    }
}

impl DecisionEngine for ModelEngine {
    fn name(&self) -> &str {
        "Model Strategy"
    }

    fn decide(&mut self, bar: &Bar) -> Decision {
        self.bars_processed += 1;
        let features = self.extract_features(bar);
        self.last_features = Some(features);

        let prediction = match self.predictor.predict(&features) {
            Ok(prediction) => prediction,
            Err(e) => {
                error!(predictor = self.predictor.name(), error = %e, "Model inference failed, holding");
                return Decision::Hold;
            }
        };

        let decision = self.map_prediction(prediction);
        if decision.is_actionable() {
            self.signals_generated += 1;
        }
        debug!(?prediction, ?features, %decision, "Model decision");
        decision
    }

    fn reset(&mut self) {
        self.history.clear();
        self.last_features = None;
        self.bars_processed = 0;
        self.signals_generated = 0;
    }

    fn state(&self) -> EngineState {
        let mut indicators = HashMap::new();
        if let Some(features) = self.last_features {
            indicators.insert("rsi".to_string(), features.rsi);
            indicators.insert("sma_diff".to_string(), features.sma_diff);
            indicators.insert("momentum".to_string(), features.momentum);
        }
        EngineState {
            name: self.name().to_string(),
            is_warmed_up: self.history.is_full(),
            bars_processed: self.bars_processed,
            signals_generated: self.signals_generated,
            indicators,
        }
    }

    /// Placeholder features are used until the history fills, so the model
    /// is consulted from the first bar.
    fn warmup_period(&self) -> usize {
        1
    }
}
