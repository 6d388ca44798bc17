//! Moving averages.

use trading_core::traits::Indicator;

/// Arithmetic mean of the last `period` closes.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Create an SMA over `period` closes.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// Distance of the newest close above its average, if the window is full.
    pub fn distance(&self, data: &[f64]) -> Option<f64> {
        let last = *data.last()?;
        self.latest(data).map(|avg| last - avg)
    }
}

impl Default for Sma {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let period = self.period as f64;
        data.windows(self.period)
            .map(|window| window.iter().sum::<f64>() / period)
            .collect()
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}
