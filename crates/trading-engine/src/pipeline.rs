//! The per-bar evaluation pipeline.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use trading_broker::PaperAccount;
use trading_core::{
    error::DataError,
    traits::{DecisionEngine, DecisionSink},
    types::{Bar, DecisionRecord},
};

/// What the pipeline did with one bar.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// The bar failed validation; nothing else ran.
    Rejected(DataError),
    /// The bar went through every step.
    Evaluated(DecisionRecord),
}

impl PipelineOutcome {
    /// The decision record, if the bar was evaluated.
    pub fn record(&self) -> Option<&DecisionRecord> {
        match self {
            PipelineOutcome::Evaluated(record) => Some(record),
            PipelineOutcome::Rejected(_) => None,
        }
    }
}

/// Fixed four-step evaluation applied to every bar:
///
/// 1. validate the bar, skipping it with a warning if malformed
/// 2. ask the engine for a decision
/// 3. execute a non-HOLD decision with the fixed trade size
/// 4. record the decision and resulting balances to the sink
///
/// Engines are passed in and cannot change the order or skip a step.
#[derive(Clone)]
pub struct EvaluationPipeline {
    trade_size: Decimal,
    sink: Arc<dyn DecisionSink>,
}

impl EvaluationPipeline {
    /// Create a pipeline trading `trade_size` units per decision.
    pub fn new(trade_size: Decimal, sink: Arc<dyn DecisionSink>) -> Self {
        Self { trade_size, sink }
    }

    /// Units bought or sold per executed decision.
    pub fn trade_size(&self) -> Decimal {
        self.trade_size
    }

    /// Run one bar through the pipeline. Never fails.
    pub fn run(
        &self,
        bar: &Bar,
        account: &PaperAccount,
        engine: &mut dyn DecisionEngine,
    ) -> PipelineOutcome {
        let price = match validated_price(bar) {
            Ok(price) => price,
            Err(e) => {
                warn!(timestamp = bar.timestamp, error = %e, "Skipping malformed bar");
                self.sink.on_rejected_bar(bar, &e);
                return PipelineOutcome::Rejected(e);
            }
        };

        let decision = engine.decide(bar);

        let execution = account.execute(decision, price, self.trade_size);
        if execution.outcome.is_refusal() {
            info!(%decision, %price, outcome = ?execution.outcome, "Trade refused");
        }

        let record = DecisionRecord {
            timestamp: bar.timestamp,
            decision,
            price,
            base_balance: execution.base_balance,
            asset_balance: execution.asset_balance,
            outcome: execution.outcome,
        };
        self.sink.record(&record);

        PipelineOutcome::Evaluated(record)
    }
}

fn validated_price(bar: &Bar) -> Result<Decimal, DataError> {
    bar.validate()?;
    let malformed = |reason: String| DataError::MalformedBar {
        timestamp: bar.timestamp,
        reason,
    };

    let price = Decimal::try_from(bar.close)
        .map_err(|e| malformed(format!("close not representable: {e}")))?;
    // Closes below Decimal precision round to zero
    if price <= Decimal::ZERO {
        return Err(malformed(format!("close {} rounds to {price}", bar.close)));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use trading_core::traits::EngineState;
    use trading_core::types::{Decision, ExecutionOutcome};
    use trading_monitor::RecordBuffer;

    /// Replays a fixed list of decisions, then holds.
    struct Scripted {
        decisions: Vec<Decision>,
        calls: usize,
    }

    impl Scripted {
        fn new(decisions: Vec<Decision>) -> Self {
            Self { decisions, calls: 0 }
        }
    }

    impl DecisionEngine for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn decide(&mut self, _bar: &Bar) -> Decision {
            let decision = self.decisions.get(self.calls).copied().unwrap_or_default();
            self.calls += 1;
            decision
        }

        fn reset(&mut self) {
            self.calls = 0;
        }

        fn state(&self) -> EngineState {
            EngineState::default()
        }

        fn warmup_period(&self) -> usize {
            0
        }
    }

    fn bar(timestamp: i64, close: f64) -> Bar {
        Bar::new(timestamp, close, close, close, close, 1000.0)
    }

    fn setup(capital: Decimal) -> (EvaluationPipeline, Arc<RecordBuffer>, PaperAccount) {
        let buffer = Arc::new(RecordBuffer::new(100));
        let pipeline = EvaluationPipeline::new(dec!(0.1), buffer.clone());
        (pipeline, buffer, PaperAccount::new(capital))
    }

    #[test]
    fn test_buy_then_sell_records_balances() {
        let (pipeline, buffer, account) = setup(dec!(10000));
        let mut engine = Scripted::new(vec![Decision::Buy, Decision::Hold, Decision::Sell]);

        pipeline.run(&bar(1, 50000.0), &account, &mut engine);
        pipeline.run(&bar(2, 51000.0), &account, &mut engine);
        let outcome = pipeline.run(&bar(3, 52000.0), &account, &mut engine);

        let records = buffer.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].outcome, ExecutionOutcome::Filled);
        assert_eq!(records[0].base_balance, dec!(5000));
        assert_eq!(records[0].asset_balance, dec!(0.1));
        assert_eq!(records[1].outcome, ExecutionOutcome::NoAction);
        assert_eq!(records[1].price, dec!(51000));

        let last = outcome.record().unwrap();
        assert_eq!(last.decision, Decision::Sell);
        assert_eq!(last.base_balance, dec!(10200));
        assert_eq!(last.asset_balance, dec!(0));
    }

    #[test]
    fn test_refusal_is_recorded_not_failed() {
        let (pipeline, buffer, account) = setup(dec!(1000));
        let mut engine = Scripted::new(vec![Decision::Buy, Decision::Sell]);

        pipeline.run(&bar(1, 50000.0), &account, &mut engine);
        pipeline.run(&bar(2, 50000.0), &account, &mut engine);

        let records = buffer.records();
        assert_eq!(records[0].outcome, ExecutionOutcome::InsufficientFunds);
        assert_eq!(records[1].outcome, ExecutionOutcome::InsufficientAssets);
        assert_eq!(account.balances(), (dec!(1000), dec!(0)));
    }

    #[test]
    fn test_malformed_bar_skips_decision() {
        let (pipeline, buffer, account) = setup(dec!(10000));
        let mut engine = Scripted::new(vec![Decision::Buy]);

        let malformed = Bar::new(9, 100.0, 90.0, 95.0, 100.0, 10.0);
        let outcome = pipeline.run(&malformed, &account, &mut engine);

        assert!(matches!(outcome, PipelineOutcome::Rejected(DataError::MalformedBar { timestamp: 9, .. })));
        assert_eq!(engine.calls, 0);
        assert!(buffer.records().is_empty());
        assert_eq!(buffer.rejected_bars(), 1);
        assert_eq!(account.balances(), (dec!(10000), dec!(0)));

        // The next valid bar gets the first scripted decision
        pipeline.run(&bar(10, 100.0), &account, &mut engine);
        assert_eq!(buffer.records()[0].decision, Decision::Buy);
    }

    #[test]
    fn test_zero_volume_and_nan_rejected() {
        let (pipeline, buffer, account) = setup(dec!(10000));
        let mut engine = Scripted::new(vec![]);

        pipeline.run(&Bar::new(1, 100.0, 100.0, 100.0, 100.0, 0.0), &account, &mut engine);
        pipeline.run(&Bar::new(2, f64::NAN, 100.0, 100.0, 100.0, 1.0), &account, &mut engine);

        assert_eq!(buffer.rejected_bars(), 2);
        assert_eq!(engine.calls, 0);
    }

    #[test]
    fn test_close_below_decimal_precision_rejected() {
        let (pipeline, buffer, account) = setup(dec!(10000));
        let mut engine = Scripted::new(vec![Decision::Buy]);

        let dust = Bar::new(1, 1e-30, 1e-30, 1e-30, 1e-30, 1.0);
        assert!(dust.validate().is_ok());

        let outcome = pipeline.run(&dust, &account, &mut engine);
        assert!(matches!(outcome, PipelineOutcome::Rejected(DataError::MalformedBar { timestamp: 1, .. })));
        assert_eq!(engine.calls, 0);
        assert!(buffer.records().is_empty());
        assert_eq!(account.balances(), (dec!(10000), dec!(0)));
    }

    #[test]
    fn test_balances_stay_non_negative() {
        let (pipeline, _buffer, account) = setup(dec!(10000));
        let decisions = (0..200)
            .map(|i| match i % 3 {
                0 => Decision::Buy,
                1 => Decision::Sell,
                _ => Decision::Buy,
            })
            .collect();
        let mut engine = Scripted::new(decisions);

        for i in 0..200 {
            let close = 40000.0 + 137.0 * (i % 50) as f64;
            if let PipelineOutcome::Evaluated(record) =
                pipeline.run(&bar(i, close), &account, &mut engine)
            {
                assert!(record.base_balance >= Decimal::ZERO);
                assert!(record.asset_balance >= Decimal::ZERO);
            }
        }
    }
}
