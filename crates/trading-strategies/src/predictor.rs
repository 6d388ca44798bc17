//! File-backed logistic predictor.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use trading_core::error::StrategyError;

use crate::{ModelFeatures, Prediction, Predictor};

/// Logistic model over the three engine features.
///
/// Loaded from a JSON file such as
/// `{"weights": [-0.08, -0.01, 0.02], "bias": 4.0}`. Produces
/// [`Prediction::Probability`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPredictor {
    /// Weights for `[rsi, sma_diff, momentum]`
    pub weights: [f64; 3],
    pub bias: f64,
}

impl LinearPredictor {
    pub fn new(weights: [f64; 3], bias: f64) -> Self {
        Self { weights, bias }
    }

    /// Load model parameters from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, StrategyError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            StrategyError::ModelUnavailable(format!("cannot read {}: {e}", path.display()))
        })?;
        let model: Self = serde_json::from_str(&contents).map_err(|e| {
            StrategyError::ModelUnavailable(format!("invalid model {}: {e}", path.display()))
        })?;
        if !model.weights.iter().chain([&model.bias]).all(|v| v.is_finite()) {
            return Err(StrategyError::ModelUnavailable(format!(
                "model {} has non-finite parameters",
                path.display()
            )));
        }
        Ok(model)
    }
}

impl Predictor for LinearPredictor {
    fn name(&self) -> &str {
        "linear"
    }

    fn predict(&self, features: &ModelFeatures) -> Result<Prediction, StrategyError> {
        let inputs = [features.rsi, features.sma_diff, features.momentum];
        let z: f64 = self
            .weights
            .iter()
            .zip(inputs)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;
        if !z.is_finite() {
            return Err(StrategyError::Prediction(format!("non-finite score for {features:?}")));
        }
        let p = 1.0 / (1.0 + (-z).exp());
        Ok(Prediction::Probability(p as f32))
    }
}
