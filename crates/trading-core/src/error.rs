//! Error types for the trading bot.

use thiserror::Error;

/// Top-level trading bot error.
#[derive(Error, Debug)]
pub enum TradingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),
}

/// Strategy-specific errors.
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Strategy not found: {0}")]
    NotFound(String),

    #[error("Model backend unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Prediction failed: {0}")]
    Prediction(String),
}

/// Market data errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Malformed bar at {timestamp}: {reason}")]
    MalformedBar { timestamp: i64, reason: String },
}

/// Failure of a single subscriber while handling one bar.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubscriberError {
    #[error("Subscriber '{subscriber}' failed: {reason}")]
    Failed { subscriber: String, reason: String },

    #[error("Subscriber '{subscriber}' panicked: {message}")]
    Panicked { subscriber: String, message: String },
}

impl SubscriberError {
    /// Name of the subscriber that failed.
    pub fn subscriber(&self) -> &str {
        match self {
            Self::Failed { subscriber, .. } | Self::Panicked { subscriber, .. } => subscriber,
        }
    }
}

/// Result type alias for trading operations.
pub type TradingResult<T> = Result<T, TradingError>;
