//! OHLCV (Open, High, Low, Close, Volume) data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::DataError;

/// A single price bar.
/// Uses f64 for fast indicator calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Trading volume
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Check that the bar can be traded on.
    ///
    /// Every field must be finite and non-negative, `high` must cover both
    /// `open` and `close`, `low` must sit below both, and `close` and
    /// `volume` must be strictly positive.
    pub fn validate(&self) -> Result<(), DataError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(self.malformed(format!("{name} is not finite")));
            }
            if value < 0.0 {
                return Err(self.malformed(format!("{name} is negative ({value})")));
            }
        }

        if self.close <= 0.0 {
            return Err(self.malformed("close must be positive".to_string()));
        }
        if self.volume <= 0.0 {
            return Err(self.malformed("volume must be positive".to_string()));
        }
        if self.high < self.open.max(self.close) {
            return Err(self.malformed(format!(
                "high ({}) is below open/close",
                self.high
            )));
        }
        if self.low > self.open.min(self.close) {
            return Err(self.malformed(format!(
                "low ({}) is above open/close",
                self.low
            )));
        }
        Ok(())
    }

    fn malformed(&self, reason: String) -> DataError {
        DataError::MalformedBar {
            timestamp: self.timestamp,
            reason,
        }
    }

    /// Get the timestamp as a DateTime.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl std::fmt::Display for Bar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bar{{timestamp={}, O={:.2}, H={:.2}, L={:.2}, C={:.2}, V={:.2}}}",
            self.datetime().to_rfc3339(),
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume
        )
    }
}

/// Bounded history of closing prices.
///
/// Once `capacity` closes are held, each push evicts the oldest one.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    closes: VecDeque<f64>,
    capacity: usize,
}

impl PriceHistory {
    /// Create an empty history holding at most `capacity` closes.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            closes: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a close, removing the oldest if at capacity.
    pub fn push(&mut self, close: f64) {
        if self.closes.len() >= self.capacity {
            self.closes.pop_front();
        }
        self.closes.push_back(close);
    }

    /// Get the number of closes held.
    #[inline]
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    /// Check if the history is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Check if the history holds `capacity` closes.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.closes.len() == self.capacity
    }

    /// Maximum number of closes kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent close.
    pub fn last(&self) -> Option<f64> {
        self.closes.back().copied()
    }

    /// Closes from oldest to newest.
    pub fn closes(&self) -> Vec<f64> {
        self.closes.iter().copied().collect()
    }

    /// Clear all closes.
    pub fn clear(&mut self) {
        self.closes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_bar() {
        let bar = Bar::new(1000, 100.0, 110.0, 95.0, 105.0, 1000000.0);

        assert!(bar.validate().is_ok());
        assert_eq!(bar.datetime().timestamp_millis(), 1000);
    }

    #[test]
    fn test_bar_validation_rejects_bad_shape() {
        // high below close
        let bar = Bar::new(1, 100.0, 101.0, 99.0, 102.0, 10.0);
        assert!(bar.validate().is_err());

        // low above open
        let bar = Bar::new(1, 100.0, 103.0, 100.5, 102.0, 10.0);
        assert!(bar.validate().is_err());
    }

    #[test]
    fn test_bar_validation_rejects_non_positive_close_and_volume() {
        assert!(Bar::new(1, 0.0, 0.0, 0.0, 0.0, 10.0).validate().is_err());
        assert!(Bar::new(1, 100.0, 101.0, 99.0, 100.0, 0.0).validate().is_err());
        assert!(Bar::new(1, 100.0, 101.0, -1.0, 100.0, 5.0).validate().is_err());
        assert!(Bar::new(1, 100.0, f64::NAN, 99.0, 100.0, 5.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_malformed_bar_carries_timestamp() {
        let err = Bar::new(42, 100.0, 101.0, 99.0, 100.0, 0.0)
            .validate()
            .unwrap_err();
        match err {
            DataError::MalformedBar { timestamp, .. } => assert_eq!(timestamp, 42),
        }
    }

    #[test]
    fn test_price_history_capacity() {
        let mut history = PriceHistory::with_capacity(3);

        history.push(100.5);
        history.push(101.5);
        history.push(102.5);
        assert_eq!(history.len(), 3);
        assert!(history.is_full());

        // Should remove oldest when at capacity
        history.push(103.5);
        assert_eq!(history.len(), 3);
        assert_eq!(history.closes(), vec![101.5, 102.5, 103.5]);
        assert_eq!(history.last(), Some(103.5));
    }

    #[test]
    fn test_bar_display() {
        let bar = Bar::new(0, 50000.0, 51000.0, 49000.0, 50500.0, 1000.0);
        let text = bar.to_string();
        assert!(text.contains("C=50500.00"));
        assert!(text.contains("1970-01-01"));
    }
}
