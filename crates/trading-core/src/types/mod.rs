//! Core data types for the trading bot.

mod decision;
mod ohlcv;
mod portfolio;

pub use decision::{Decision, DecisionRecord, ExecutionOutcome};
pub use ohlcv::{Bar, PriceHistory};
pub use portfolio::Portfolio;
