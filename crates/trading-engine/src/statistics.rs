//! Session statistics.

use serde::{Deserialize, Serialize};
use trading_core::types::{Decision, ExecutionOutcome};

use crate::PipelineOutcome;

/// Counters for one bot session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Bars received, valid or not
    pub bars_seen: usize,
    /// Bars skipped by validation
    pub bars_rejected: usize,
    /// BUY decisions emitted
    pub buy_signals: usize,
    /// SELL decisions emitted
    pub sell_signals: usize,
    /// BUY decisions that filled
    pub buys_executed: usize,
    /// SELL decisions that filled
    pub sells_executed: usize,
    /// BUY/SELL decisions refused by the portfolio
    pub refusals: usize,
}

impl SessionStats {
    /// Create empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one pipeline run.
    pub fn record(&mut self, outcome: &PipelineOutcome) {
        self.bars_seen += 1;
        let record = match outcome {
            PipelineOutcome::Rejected(_) => {
                self.bars_rejected += 1;
                return;
            }
            PipelineOutcome::Evaluated(record) => record,
        };

        match record.decision {
            Decision::Buy => self.buy_signals += 1,
            Decision::Sell => self.sell_signals += 1,
            Decision::Hold => {}
        }

        match (record.decision, record.outcome) {
            (Decision::Buy, ExecutionOutcome::Filled) => self.buys_executed += 1,
            (Decision::Sell, ExecutionOutcome::Filled) => self.sells_executed += 1,
            (_, outcome) if outcome.is_refusal() => self.refusals += 1,
            _ => {}
        }
    }

    /// Bars that reached the engine.
    pub fn bars_evaluated(&self) -> usize {
        self.bars_seen - self.bars_rejected
    }

    /// Trades that filled.
    pub fn trades_executed(&self) -> usize {
        self.buys_executed + self.sells_executed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use trading_core::error::DataError;
    use trading_core::types::DecisionRecord;

    fn evaluated(decision: Decision, outcome: ExecutionOutcome) -> PipelineOutcome {
        PipelineOutcome::Evaluated(DecisionRecord {
            timestamp: 0,
            decision,
            price: dec!(100),
            base_balance: dec!(0),
            asset_balance: dec!(0),
            outcome,
        })
    }

    #[test]
    fn test_counts() {
        let mut stats = SessionStats::new();
        stats.record(&evaluated(Decision::Buy, ExecutionOutcome::Filled));
        stats.record(&evaluated(Decision::Buy, ExecutionOutcome::InsufficientFunds));
        stats.record(&evaluated(Decision::Sell, ExecutionOutcome::Filled));
        stats.record(&evaluated(Decision::Hold, ExecutionOutcome::NoAction));
        stats.record(&PipelineOutcome::Rejected(DataError::MalformedBar {
            timestamp: 0,
            reason: "zero volume".into(),
        }));

        assert_eq!(stats.bars_seen, 5);
        assert_eq!(stats.bars_rejected, 1);
        assert_eq!(stats.bars_evaluated(), 4);
        assert_eq!(stats.buy_signals, 2);
        assert_eq!(stats.sell_signals, 1);
        assert_eq!(stats.trades_executed(), 2);
        assert_eq!(stats.refusals, 1);
    }
}
