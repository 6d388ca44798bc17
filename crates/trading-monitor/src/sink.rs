//! Decision sinks.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{error, info, warn};
use trading_core::{
    error::{DataError, SubscriberError},
    traits::DecisionSink,
    types::{Bar, DecisionRecord},
};

/// Emits every record as a structured `tracing` event on the
/// `trading::decisions` target.
#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    bot: Option<String>,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag every event with a bot name.
    pub fn for_bot(name: impl Into<String>) -> Self {
        Self {
            bot: Some(name.into()),
        }
    }

    fn bot(&self) -> &str {
        self.bot.as_deref().unwrap_or("-")
    }
}

impl DecisionSink for TracingSink {
    fn record(&self, record: &DecisionRecord) {
        info!(
            target: "trading::decisions",
            bot = self.bot(),
            timestamp = record.timestamp,
            decision = %record.decision,
            price = %record.price,
            base_balance = %record.base_balance,
            asset_balance = %record.asset_balance,
            outcome = ?record.outcome,
            "Decision recorded"
        );
    }

    fn on_rejected_bar(&self, bar: &Bar, error: &DataError) {
        warn!(target: "trading::decisions", bot = self.bot(), %bar, %error, "Bar rejected");
    }

    fn on_subscriber_error(&self, bar: &Bar, error: &SubscriberError) {
        error!(
            target: "trading::decisions",
            subscriber = error.subscriber(),
            timestamp = bar.timestamp,
            %error,
            "Subscriber failed"
        );
    }
}

/// Keeps the most recent records in memory.
///
/// Oldest records are dropped once `capacity` is reached. Rejected bars and
/// subscriber failures are counted.
#[derive(Debug)]
pub struct RecordBuffer {
    records: Mutex<VecDeque<DecisionRecord>>,
    capacity: usize,
    rejected_bars: AtomicUsize,
    subscriber_errors: AtomicUsize,
}

impl RecordBuffer {
    /// Create a buffer holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            rejected_bars: AtomicUsize::new(0),
            subscriber_errors: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<DecisionRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Buffered records, oldest first.
    pub fn records(&self) -> Vec<DecisionRecord> {
        self.lock().iter().cloned().collect()
    }

    /// Most recent record.
    pub fn last(&self) -> Option<DecisionRecord> {
        self.lock().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Bars rejected by validation so far.
    pub fn rejected_bars(&self) -> usize {
        self.rejected_bars.load(Ordering::Relaxed)
    }

    /// Subscriber failures reported so far.
    pub fn subscriber_errors(&self) -> usize {
        self.subscriber_errors.load(Ordering::Relaxed)
    }

    /// Drop all records and reset the counters.
    pub fn clear(&self) {
        self.lock().clear();
        self.rejected_bars.store(0, Ordering::Relaxed);
        self.subscriber_errors.store(0, Ordering::Relaxed);
    }
}

impl DecisionSink for RecordBuffer {
    fn record(&self, record: &DecisionRecord) {
        if self.capacity == 0 {
            return;
        }
        let mut records = self.lock();
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record.clone());
    }

    fn on_rejected_bar(&self, _bar: &Bar, _error: &DataError) {
        self.rejected_bars.fetch_add(1, Ordering::Relaxed);
    }

    fn on_subscriber_error(&self, _bar: &Bar, _error: &SubscriberError) {
        self.subscriber_errors.fetch_add(1, Ordering::Relaxed);
    }
}
