//! Decision engine implementations.
//!
//! This crate provides the engines a bot can run:
//! - RSI-based decisions over a bounded close history
//! - Model-based decisions delegated to an external [`Predictor`], with a
//!   file-backed [`LinearPredictor`]
//!
//! Engines are created through the [`StrategyRegistry`] from a configuration
//! tag, never by inspecting concrete types at call sites.

mod model_strategy;
mod predictor;
mod registry;
mod rsi_strategy;

pub use model_strategy::{ModelConfig, ModelEngine, ModelFeatures, Prediction, Predictor};
pub use predictor::LinearPredictor;
pub use registry::{StrategyInfo, StrategyKind, StrategyRegistry, StrategySettings};
pub use rsi_strategy::{RsiConfig, RsiEngine};
