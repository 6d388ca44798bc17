//! Subscriber registry and bar fan-out.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error};
use trading_core::{
    error::SubscriberError,
    traits::{DecisionSink, Subscriber},
    types::Bar,
};

/// Result of delivering one bar.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PublishReport {
    /// Subscribers that handled the bar without error
    pub delivered: usize,
    /// Failures, in delivery order
    pub failures: Vec<SubscriberError>,
}

impl PublishReport {
    /// Check whether every subscriber handled the bar.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Ordered registry of bar subscribers.
///
/// Registry changes are serialized by one lock. `publish` copies the registry
/// under the lock and calls subscribers after releasing it, so callbacks may
/// subscribe or unsubscribe without deadlocking. Changes made during a
/// delivery take effect from the next bar.
pub struct EventBus {
    subscribers: Mutex<Vec<Arc<dyn Subscriber>>>,
    sink: Option<Arc<dyn DecisionSink>>,
}

impl EventBus {
    /// Create an empty bus that only logs subscriber failures.
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            sink: None,
        }
    }

    /// Also report subscriber failures to `sink`.
    pub fn with_sink(sink: Arc<dyn DecisionSink>) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            sink: Some(sink),
        }
    }

    fn registry(&self) -> MutexGuard<'_, Vec<Arc<dyn Subscriber>>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a subscriber. Returns `false` if this handle is already
    /// registered.
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>) -> bool {
        let mut registry = self.registry();
        if registry.iter().any(|s| same_subscriber(s, &subscriber)) {
            debug!(subscriber = subscriber.name(), "Subscriber already registered");
            return false;
        }
        debug!(subscriber = subscriber.name(), "Subscriber registered");
        registry.push(subscriber);
        true
    }

    /// Remove a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, subscriber: &Arc<dyn Subscriber>) -> bool {
        let mut registry = self.registry();
        let before = registry.len();
        registry.retain(|s| !same_subscriber(s, subscriber));
        registry.len() != before
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.registry().len()
    }

    /// Deliver `bar` to every subscriber registered at call time, in
    /// registration order.
    ///
    /// A subscriber that returns an error or panics is reported and skipped;
    /// the remaining subscribers still receive the bar.
    pub fn publish(&self, bar: &Bar) -> PublishReport {
        let snapshot: Vec<Arc<dyn Subscriber>> = self.registry().clone();
        let mut report = PublishReport::default();

        for subscriber in &snapshot {
            let result = panic::catch_unwind(AssertUnwindSafe(|| subscriber.on_bar(bar)))
                .unwrap_or_else(|payload| {
                    Err(SubscriberError::Panicked {
                        subscriber: subscriber.name().to_string(),
                        message: panic_message(payload.as_ref()),
                    })
                });

            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    error!(subscriber = e.subscriber(), timestamp = bar.timestamp, error = %e, "Subscriber failed");
                    if let Some(sink) = &self.sink {
                        sink.on_subscriber_error(bar, &e);
                    }
                    report.failures.push(e);
                }
            }
        }

        report
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// Compares data pointers only; vtable pointers for one type may differ
// between codegen units.
fn same_subscriber(a: &Arc<dyn Subscriber>, b: &Arc<dyn Subscriber>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
