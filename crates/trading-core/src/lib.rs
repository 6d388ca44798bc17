//! Core types and traits for the trading bot.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, PriceHistory)
//! - The two-balance paper portfolio
//! - Decisions, execution outcomes and decision records
//! - Core traits for decision engines, bar subscribers, decision sinks and indicators

pub mod types;
pub mod traits;
pub mod error;

pub use error::{TradingError, TradingResult};
pub use types::*;
pub use traits::*;
