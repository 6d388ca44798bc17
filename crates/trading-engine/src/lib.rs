//! Bar evaluation and the trading bot.
//!
//! [`EvaluationPipeline`] is the fixed validate, decide, execute, record
//! sequence applied to every bar. [`TradingBot`] wires one engine and one
//! paper account to the pipeline and subscribes to the event bus.

mod bot;
mod pipeline;
mod report;
mod statistics;

pub use bot::TradingBot;
pub use pipeline::{EvaluationPipeline, PipelineOutcome};
pub use report::SessionReport;
pub use statistics::SessionStats;
