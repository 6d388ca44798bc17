//! Bar subscriber trait.

use crate::error::SubscriberError;
use crate::types::Bar;

/// Anything that wants to receive generated bars.
///
/// Subscribers are shared between the registering context and the generator
/// loop, so `on_bar` takes `&self` and implementors keep their mutable state
/// behind their own locks. Callbacks run outside the bus registry lock and
/// must not assume exclusive access to the registry.
pub trait Subscriber: Send + Sync {
    /// Name used when reporting failures.
    fn name(&self) -> &str;

    /// Handle one bar.
    ///
    /// An error only affects this subscriber; the bus reports it and keeps
    /// delivering the bar to the others.
    fn on_bar(&self, bar: &Bar) -> Result<(), SubscriberError>;
}
