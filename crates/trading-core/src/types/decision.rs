//! Trading decisions and the records kept for each evaluated bar.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decision produced by an engine for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Decision {
    /// Whether the decision asks for a trade.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Decision::Hold)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::Buy => "BUY",
            Decision::Sell => "SELL",
            Decision::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

/// What happened when a decision was carried out against the portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// HOLD: nothing was attempted.
    NoAction,
    /// The trade went through.
    Filled,
    /// BUY refused, not enough base currency.
    InsufficientFunds,
    /// SELL refused, not enough asset.
    InsufficientAssets,
}

impl ExecutionOutcome {
    /// Whether a trade was attempted and refused.
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            ExecutionOutcome::InsufficientFunds | ExecutionOutcome::InsufficientAssets
        )
    }
}

/// Structured record emitted once per evaluated bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Bar timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Decision taken for the bar
    pub decision: Decision,
    /// Price the decision was evaluated at (bar close)
    pub price: Decimal,
    /// Base currency balance after execution
    pub base_balance: Decimal,
    /// Asset balance after execution
    pub asset_balance: Decimal,
    /// Result of the execution step
    pub outcome: ExecutionOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decision_display() {
        assert_eq!(Decision::Buy.to_string(), "BUY");
        assert_eq!(Decision::Sell.to_string(), "SELL");
        assert_eq!(Decision::Hold.to_string(), "HOLD");
        assert!(!Decision::default().is_actionable());
    }

    #[test]
    fn test_record_serializes_uppercase_decision() {
        let record = DecisionRecord {
            timestamp: 1,
            decision: Decision::Sell,
            price: dec!(50000),
            base_balance: dec!(10000),
            asset_balance: dec!(0),
            outcome: ExecutionOutcome::InsufficientAssets,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["decision"], "SELL");
        assert_eq!(json["outcome"], "insufficient_assets");
        assert!(record.outcome.is_refusal());
    }
}
