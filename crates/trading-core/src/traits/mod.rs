//! Core traits for the trading bot.

mod indicator;
mod sink;
mod strategy;
mod subscriber;

pub use indicator::Indicator;
pub use sink::DecisionSink;
pub use strategy::{DecisionEngine, EngineConfig, EngineState};
pub use subscriber::Subscriber;
