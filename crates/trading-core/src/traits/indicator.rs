//! Indicator trait definitions.

/// Trait for technical indicators computed over a window of closes.
///
/// Indicators are stateless: engines own the price history and hand the
/// indicator a slice of closes ordered from oldest to newest.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values for the given closes.
    ///
    /// Returns one value per complete window, oldest first. An empty vector
    /// means there was not enough data.
    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Value for the most recent window, if there is enough data.
    fn latest(&self, data: &[f64]) -> Option<Self::Output> {
        self.calculate(data).pop()
    }
}
