//! End-of-session report.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use trading_core::types::Portfolio;

use crate::SessionStats;

/// Summary of one bot session.
///
/// Values are marked at the last traded price; with no trades the asset
/// balance is zero and the mark does not matter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub bot_name: String,
    pub strategy: String,
    pub generated_at: DateTime<Utc>,
    pub initial_balance: Decimal,
    pub final_base_balance: Decimal,
    pub final_asset_balance: Decimal,
    pub mark_price: Decimal,
    pub total_value: Decimal,
    pub pnl_percent: Decimal,
    pub stats: SessionStats,
}

impl SessionReport {
    /// Build a report from a final portfolio snapshot.
    pub fn new(bot_name: &str, strategy: &str, portfolio: Portfolio, stats: SessionStats) -> Self {
        let mark_price = portfolio.last_traded_price().unwrap_or(Decimal::ZERO);
        Self {
            bot_name: bot_name.to_string(),
            strategy: strategy.to_string(),
            generated_at: Utc::now(),
            initial_balance: portfolio.initial_base_balance(),
            final_base_balance: portfolio.base_balance(),
            final_asset_balance: portfolio.asset_balance(),
            mark_price,
            total_value: portfolio.total_value(mark_price),
            pnl_percent: portfolio.pnl_percent(mark_price),
            stats,
        }
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str(&format!("  SESSION REPORT: {} ({})\n", self.bot_name, self.strategy));
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str("PORTFOLIO\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Initial Balance:     ${:.2}\n", self.initial_balance));
        s.push_str(&format!("  Base Balance:        ${:.2}\n", self.final_base_balance));
        s.push_str(&format!("  Asset Balance:       {:.4}\n", self.final_asset_balance));
        s.push_str(&format!("  Mark Price:          ${:.2}\n", self.mark_price));
        s.push_str(&format!("  Total Value:         ${:.2}\n", self.total_value));
        s.push_str(&format!("  PnL:                 {:.2}%\n", self.pnl_percent));
        s.push('\n');

        s.push_str("ACTIVITY\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Bars Seen:           {}\n", self.stats.bars_seen));
        s.push_str(&format!("  Bars Rejected:       {}\n", self.stats.bars_rejected));
        s.push_str(&format!("  Buy Signals:         {}\n", self.stats.buy_signals));
        s.push_str(&format!("  Sell Signals:        {}\n", self.stats.sell_signals));
        s.push_str(&format!("  Buys Executed:       {}\n", self.stats.buys_executed));
        s.push_str(&format!("  Sells Executed:      {}\n", self.stats.sells_executed));
        s.push_str(&format!("  Refused Trades:      {}\n", self.stats.refusals));
        s.push('\n');

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_report_summary() {
        let mut portfolio = Portfolio::new(dec!(10000));
        portfolio.buy(dec!(50000), dec!(0.1));
        portfolio.sell(dec!(52000), dec!(0.05));

        let stats = SessionStats {
            bars_seen: 40,
            buys_executed: 1,
            sells_executed: 1,
            ..Default::default()
        };
        let report = SessionReport::new("RSI-Bot", "RSI Strategy", portfolio, stats);

        assert_eq!(report.mark_price, dec!(52000));
        assert_eq!(report.total_value, dec!(10200));
        assert_eq!(report.pnl_percent, dec!(2));

        let summary = report.summary();
        assert!(summary.contains("RSI-Bot"));
        assert!(summary.contains("2.00%"));
        assert!(summary.contains("Bars Seen:           40"));
    }

    #[test]
    fn test_report_json() {
        let report = SessionReport::new(
            "AI-Bot",
            "Model Strategy",
            Portfolio::new(dec!(10000)),
            SessionStats::default(),
        );

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["bot_name"], "AI-Bot");
        assert_eq!(json["stats"]["bars_seen"], 0);
        assert_eq!(report.mark_price, Decimal::ZERO);
    }
}
