//! Observability sink for evaluated bars.

use crate::error::{DataError, SubscriberError};
use crate::types::{Bar, DecisionRecord};

/// Destination for decision records and non-fatal failures.
///
/// The pipeline holds an explicit sink handle instead of reaching for a
/// process-wide logger. Implementations decide the format: structured logs,
/// an in-memory buffer, a metrics backend.
pub trait DecisionSink: Send + Sync {
    /// Record the outcome of one evaluated bar.
    fn record(&self, record: &DecisionRecord);

    /// A bar failed validation and was skipped.
    fn on_rejected_bar(&self, _bar: &Bar, _error: &DataError) {}

    /// A subscriber failed while handling a bar.
    fn on_subscriber_error(&self, _bar: &Bar, _error: &SubscriberError) {}
}
