//! Logging setup and decision sinks.

mod logging;
mod sink;

pub use logging::{setup_logging, LogFormat, LoggingConfig};
pub use sink::{RecordBuffer, TracingSink};
