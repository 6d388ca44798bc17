//! Trading bot subscriber.

use std::sync::{Mutex, MutexGuard, PoisonError};
use trading_broker::PaperAccount;
use trading_core::{
    error::SubscriberError,
    traits::{DecisionEngine, EngineState, Subscriber},
    types::{Bar, Decision},
};

use crate::{EvaluationPipeline, PipelineOutcome, SessionReport, SessionStats};

#[derive(Debug, Default)]
struct Observed {
    last_decision: Decision,
    last_bar: Option<Bar>,
    stats: SessionStats,
}

/// One engine trading one paper account, driven by the event bus.
///
/// Presentation code polls the accessors; only the pipeline writes to the
/// account.
pub struct TradingBot {
    name: String,
    engine: Mutex<Box<dyn DecisionEngine>>,
    account: PaperAccount,
    pipeline: EvaluationPipeline,
    observed: Mutex<Observed>,
}

impl TradingBot {
    /// Create a bot.
    pub fn new(
        name: impl Into<String>,
        engine: Box<dyn DecisionEngine>,
        account: PaperAccount,
        pipeline: EvaluationPipeline,
    ) -> Self {
        Self {
            name: name.into(),
            engine: Mutex::new(engine),
            account,
            pipeline,
            observed: Mutex::new(Observed::default()),
        }
    }

    fn engine(&self) -> MutexGuard<'_, Box<dyn DecisionEngine>> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn observed(&self) -> MutexGuard<'_, Observed> {
        self.observed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bot name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the engine in use.
    pub fn strategy_name(&self) -> String {
        self.engine().name().to_string()
    }

    /// The account this bot trades.
    pub fn account(&self) -> &PaperAccount {
        &self.account
    }

    /// Decision for the most recent valid bar, HOLD before the first one.
    pub fn last_decision(&self) -> Decision {
        self.observed().last_decision
    }

    /// Most recent bar received, valid or not.
    pub fn last_bar(&self) -> Option<Bar> {
        self.observed().last_bar
    }

    /// Session counters so far.
    pub fn stats(&self) -> SessionStats {
        self.observed().stats.clone()
    }

    /// Engine state for monitoring.
    pub fn engine_state(&self) -> EngineState {
        self.engine().state()
    }

    /// Build the end-of-session report.
    pub fn report(&self) -> SessionReport {
        SessionReport::new(
            &self.name,
            &self.strategy_name(),
            self.account.snapshot(),
            self.stats(),
        )
    }

    /// Run one bar through the pipeline.
    pub fn process(&self, bar: &Bar) -> PipelineOutcome {
        let outcome = {
            let mut engine = self.engine();
            self.pipeline.run(bar, &self.account, &mut **engine)
        };

        let mut observed = self.observed();
        observed.last_bar = Some(*bar);
        if let Some(record) = outcome.record() {
            observed.last_decision = record.decision;
        }
        observed.stats.record(&outcome);
        outcome
    }
}

impl Subscriber for TradingBot {
    fn name(&self) -> &str {
        &self.name
    }

    /// Malformed bars are handled inside the pipeline, so this never fails.
    fn on_bar(&self, bar: &Bar) -> Result<(), SubscriberError> {
        self.process(bar);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use trading_monitor::RecordBuffer;
    use trading_strategies::{RsiConfig, RsiEngine};

    fn bot(capital: rust_decimal::Decimal) -> (TradingBot, Arc<RecordBuffer>) {
        let buffer = Arc::new(RecordBuffer::new(64));
        let pipeline = EvaluationPipeline::new(dec!(0.1), buffer.clone());
        let engine = Box::new(RsiEngine::new(RsiConfig::default()));
        (
            TradingBot::new("RSI-Bot", engine, PaperAccount::new(capital), pipeline),
            buffer,
        )
    }

    fn bar(i: i64, close: f64) -> Bar {
        Bar::new(i, close, close + 50.0, close - 50.0, close, 1000.0)
    }

    #[test]
    fn test_declining_market_buys_once_warmed_up() {
        let (bot, buffer) = bot(dec!(10000));
        assert_eq!(bot.last_decision(), Decision::Hold);
        assert!(bot.last_bar().is_none());

        for i in 0..15 {
            bot.on_bar(&bar(i, 50000.0 - 100.0 * i as f64)).unwrap();
        }

        assert_eq!(bot.last_decision(), Decision::Buy);
        assert_eq!(bot.last_bar().unwrap().close, 48600.0);
        assert_eq!(bot.account().balances(), (dec!(5140), dec!(0.1)));
        assert_eq!(buffer.records().len(), 15);

        let stats = bot.stats();
        assert_eq!(stats.bars_seen, 15);
        assert_eq!(stats.buys_executed, 1);
        assert_eq!(bot.engine_state().bars_processed, 15);
    }

    #[test]
    fn test_rejected_bar_keeps_last_decision() {
        let (bot, _buffer) = bot(dec!(10000));
        bot.on_bar(&Bar::new(1, 100.0, 100.0, 100.0, 100.0, 0.0)).unwrap();

        assert_eq!(bot.last_decision(), Decision::Hold);
        assert_eq!(bot.last_bar().unwrap().timestamp, 1);
        assert_eq!(bot.stats().bars_rejected, 1);
        assert_eq!(bot.engine_state().bars_processed, 0);
    }

    #[test]
    fn test_report_reflects_account() {
        let (bot, _buffer) = bot(dec!(10000));
        let report = bot.report();

        assert_eq!(report.bot_name, "RSI-Bot");
        assert_eq!(report.strategy, "RSI Strategy");
        assert_eq!(report.final_base_balance, dec!(10000));
        assert_eq!(report.pnl_percent, dec!(0));
    }
}
