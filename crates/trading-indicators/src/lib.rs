//! Technical indicators over close histories.
//!
//! This crate provides the indicators the decision engines feed on:
//! - Momentum indicators (simple-average RSI, N-period momentum)
//! - Moving averages (SMA)
//!
//! Indicators are batch computations over a slice of closes ordered from
//! oldest to newest; engines keep the bounded history themselves.

pub mod momentum;
pub mod moving_average;

pub use momentum::{Momentum, Rsi};
pub use moving_average::Sma;
