//! Strategy registry for selecting a decision engine by tag.

use crate::{ModelConfig, ModelEngine, Predictor, RsiConfig, RsiEngine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use trading_broker::PaperAccount;
use trading_core::{error::StrategyError, traits::DecisionEngine, traits::EngineConfig};

/// Built-in engine kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Threshold rules over RSI
    Rsi,
    /// External prediction model
    Model,
}

impl StrategyKind {
    /// Canonical tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            StrategyKind::Rsi => "rsi",
            StrategyKind::Model => "model",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for StrategyKind {
    type Err = StrategyError;

    /// Accepts the canonical tags, the menu numbers `1`/`2`, and `ai`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rsi" | "1" => Ok(StrategyKind::Rsi),
            "model" | "ai" | "2" => Ok(StrategyKind::Model),
            _ => Err(StrategyError::NotFound(s.to_string())),
        }
    }
}

/// Strategy section of the application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    /// Engine tag, see [`StrategyKind`]
    pub kind: String,
    /// RSI engine parameters
    pub rsi: RsiConfig,
    /// Model engine parameters
    pub model: ModelConfig,
    /// Parameters file for [`LinearPredictor`](crate::LinearPredictor)
    pub model_path: Option<PathBuf>,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            kind: StrategyKind::Rsi.tag().to_string(),
            rsi: RsiConfig::default(),
            model: ModelConfig::default(),
            model_path: None,
        }
    }
}

impl StrategySettings {
    /// Validate the tag and every engine's parameters.
    pub fn validate(&self) -> Result<(), StrategyError> {
        self.kind.parse::<StrategyKind>()?;
        self.rsi.validate()?;
        self.model.validate()
    }
}

/// Information about a registered strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Canonical tag
    pub kind: StrategyKind,
    /// Strategy name
    pub name: String,
    /// Strategy description
    pub description: String,
    /// Default configuration as JSON
    pub default_config: serde_json::Value,
}

/// Registry for available decision engines.
///
/// The model engine needs a [`Predictor`]; without one, creating it fails with
/// [`StrategyError::ModelUnavailable`] and callers decide whether to fall back.
pub struct StrategyRegistry {
    strategies: BTreeMap<StrategyKind, StrategyInfo>,
    predictor: Option<Arc<dyn Predictor>>,
}

impl StrategyRegistry {
    /// Create a new registry with all built-in strategies and no predictor.
    pub fn new() -> Self {
        let mut strategies = BTreeMap::new();

        strategies.insert(
            StrategyKind::Rsi,
            StrategyInfo {
                kind: StrategyKind::Rsi,
                name: "RSI Strategy".to_string(),
                description: "Buys below the oversold RSI level and sells above the overbought level"
                    .to_string(),
                default_config: serde_json::to_value(RsiConfig::default()).unwrap_or_default(),
            },
        );

        strategies.insert(
            StrategyKind::Model,
            StrategyInfo {
                kind: StrategyKind::Model,
                name: "Model Strategy".to_string(),
                description: "Maps predictions of an external model to decisions".to_string(),
                default_config: serde_json::to_value(ModelConfig::default()).unwrap_or_default(),
            },
        );

        Self {
            strategies,
            predictor: None,
        }
    }

    /// Attach the predictor used for model engines.
    pub fn with_predictor(mut self, predictor: Arc<dyn Predictor>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    /// Check whether a model engine can be created.
    pub fn has_predictor(&self) -> bool {
        self.predictor.is_some()
    }

    /// List all available strategies.
    pub fn list(&self) -> Vec<&StrategyInfo> {
        self.strategies.values().collect()
    }

    /// Get strategy info by tag.
    pub fn get(&self, tag: &str) -> Option<&StrategyInfo> {
        let kind = tag.parse::<StrategyKind>().ok()?;
        self.strategies.get(&kind)
    }

    /// Check if a strategy exists.
    pub fn exists(&self, tag: &str) -> bool {
        self.get(tag).is_some()
    }

    /// Get all canonical tags.
    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.keys().map(StrategyKind::tag).collect()
    }

    /// Create an engine from a tag and the strategy settings.
    ///
    /// `account` is handed to engines that need to read holdings.
    pub fn create(
        &self,
        tag: &str,
        settings: &StrategySettings,
        account: PaperAccount,
    ) -> Result<Box<dyn DecisionEngine>, StrategyError> {
        match tag.parse::<StrategyKind>()? {
            StrategyKind::Rsi => {
                settings.rsi.validate()?;
                Ok(Box::new(RsiEngine::new(settings.rsi.clone())))
            }
            StrategyKind::Model => {
                settings.model.validate()?;
                let predictor = self.predictor.clone().ok_or_else(|| {
                    StrategyError::ModelUnavailable("no predictor is configured".to_string())
                })?;
                Ok(Box::new(ModelEngine::new(
                    settings.model.clone(),
                    predictor,
                    account,
                )))
            }
        }
    }

    /// Create a strategy with default configuration.
    pub fn create_default(
        &self,
        tag: &str,
        account: PaperAccount,
    ) -> Result<Box<dyn DecisionEngine>, StrategyError> {
        self.create(tag, &StrategySettings::default(), account)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
