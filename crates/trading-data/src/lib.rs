//! Market data distribution.
//!
//! - [`EventBus`]: ordered subscriber registry that fans each bar out to
//!   every subscriber, isolating failures
//! - [`BarGenerator`]: background task publishing one synthetic bar per
//!   interval
//! - [`RandomWalk`]: the bar synthesis behind the generator

mod event_bus;
mod generator;

pub use event_bus::{EventBus, PublishReport};
pub use generator::{BarGenerator, GeneratorConfig, GeneratorState, RandomWalk};
