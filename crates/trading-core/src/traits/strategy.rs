//! Decision engine trait definitions.

use crate::error::StrategyError;
use crate::types::{Bar, Decision};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration trait for decision engines.
pub trait EngineConfig: Send + Sync + Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), StrategyError>;
}

/// State of a decision engine for monitoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineState {
    /// Engine name
    pub name: String,
    /// Whether the engine has seen enough bars to leave warm-up
    pub is_warmed_up: bool,
    /// Number of bars processed
    pub bars_processed: usize,
    /// Number of BUY/SELL decisions emitted
    pub signals_generated: usize,
    /// Current indicator values
    pub indicators: HashMap<String, f64>,
}

/// Core decision engine trait.
///
/// An engine turns each bar into a [`Decision`]. Engines may keep private
/// state across calls (price history, counters) but must be deterministic
/// given that state and the bar sequence. Engines never touch the portfolio
/// directly; executing the decision is the pipeline's job.
///
/// Engines backed by external collaborators must turn their own failures into
/// [`Decision::Hold`] before returning.
pub trait DecisionEngine: Send {
    /// Get the unique name of this engine.
    fn name(&self) -> &str;

    /// Process a new bar and produce a decision.
    ///
    /// Called exactly once per validated bar, in bar order.
    fn decide(&mut self, bar: &Bar) -> Decision;

    /// Reset the engine state.
    fn reset(&mut self);

    /// Get the current engine state for monitoring.
    fn state(&self) -> EngineState;

    /// Get the warmup period (number of bars needed before non-HOLD decisions).
    fn warmup_period(&self) -> usize;

    /// Check if the engine is warmed up.
    fn is_warmed_up(&self, bars_available: usize) -> bool {
        bars_available >= self.warmup_period()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlternatingEngine {
        warmup: usize,
        bars_seen: usize,
    }

    impl DecisionEngine for AlternatingEngine {
        fn name(&self) -> &str {
            "alternating"
        }

        fn decide(&mut self, _bar: &Bar) -> Decision {
            self.bars_seen += 1;
            if self.bars_seen < self.warmup {
                Decision::Hold
            } else if self.bars_seen % 2 == 0 {
                Decision::Buy
            } else {
                Decision::Sell
            }
        }

        fn reset(&mut self) {
            self.bars_seen = 0;
        }

        fn state(&self) -> EngineState {
            EngineState {
                name: self.name().to_string(),
                is_warmed_up: self.is_warmed_up(self.bars_seen),
                bars_processed: self.bars_seen,
                ..Default::default()
            }
        }

        fn warmup_period(&self) -> usize {
            self.warmup
        }
    }

    #[test]
    fn test_engine_warmup() {
        let mut engine = AlternatingEngine {
            warmup: 3,
            bars_seen: 0,
        };
        let bar = Bar::new(0, 100.0, 101.0, 99.0, 100.0, 10.0);

        assert_eq!(engine.decide(&bar), Decision::Hold);
        assert!(!engine.state().is_warmed_up);
        engine.decide(&bar);
        assert_eq!(engine.decide(&bar), Decision::Sell);
        assert!(engine.state().is_warmed_up);

        engine.reset();
        assert_eq!(engine.state().bars_processed, 0);
    }
}
