//! Paper account for simulated trading.

use rust_decimal::Decimal;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use trading_core::types::{Decision, ExecutionOutcome, Portfolio};

/// Result of executing one decision, with the balances it left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    pub outcome: ExecutionOutcome,
    pub base_balance: Decimal,
    pub asset_balance: Decimal,
}

/// Shared handle to a paper portfolio.
///
/// Clones share the same portfolio. Every read and write goes through one
/// mutex, so a reader on another thread sees either the whole trade or none
/// of it, never a base balance updated against a stale asset balance.
#[derive(Debug, Clone)]
pub struct PaperAccount {
    portfolio: Arc<Mutex<Portfolio>>,
}

impl PaperAccount {
    /// Create a new paper account with initial capital.
    pub fn new(initial_capital: Decimal) -> Self {
        Self::from_portfolio(Portfolio::new(initial_capital))
    }

    /// Wrap an existing portfolio.
    pub fn from_portfolio(portfolio: Portfolio) -> Self {
        Self {
            portfolio: Arc::new(Mutex::new(portfolio)),
        }
    }

    // Portfolio operations cannot leave it half-updated, so a poisoned lock
    // still guards a consistent value.
    fn lock(&self) -> MutexGuard<'_, Portfolio> {
        self.portfolio.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Carry out a decision with a fixed trade size.
    ///
    /// HOLD does nothing. A refused trade leaves the portfolio untouched and
    /// is reported through the outcome, not as an error. The returned balances
    /// are read under the same lock as the trade.
    pub fn execute(&self, decision: Decision, price: Decimal, amount: Decimal) -> Execution {
        let mut portfolio = self.lock();
        let outcome = match decision {
            Decision::Hold => ExecutionOutcome::NoAction,
            Decision::Buy if portfolio.buy(price, amount) => ExecutionOutcome::Filled,
            Decision::Buy => ExecutionOutcome::InsufficientFunds,
            Decision::Sell if portfolio.sell(price, amount) => ExecutionOutcome::Filled,
            Decision::Sell => ExecutionOutcome::InsufficientAssets,
        };
        let execution = Execution {
            outcome,
            base_balance: portfolio.base_balance(),
            asset_balance: portfolio.asset_balance(),
        };
        drop(portfolio);

        debug!(%decision, %price, %amount, ?outcome, "Executed decision");
        execution
    }

    /// Get a consistent copy of the portfolio.
    pub fn snapshot(&self) -> Portfolio {
        self.lock().clone()
    }

    /// Base and asset balances read together.
    pub fn balances(&self) -> (Decimal, Decimal) {
        let portfolio = self.lock();
        (portfolio.base_balance(), portfolio.asset_balance())
    }

    /// Check if any asset is held.
    pub fn has_assets(&self) -> bool {
        self.lock().has_assets()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::thread;

    #[test]
    fn test_execute_buy_and_sell() {
        let account = PaperAccount::new(dec!(10000));

        let execution = account.execute(Decision::Buy, dec!(50000), dec!(0.1));
        assert_eq!(execution.outcome, ExecutionOutcome::Filled);
        assert_eq!(account.balances(), (dec!(5000), dec!(0.1)));

        let execution = account.execute(Decision::Sell, dec!(52000), dec!(0.1));
        assert_eq!(
            execution,
            Execution {
                outcome: ExecutionOutcome::Filled,
                base_balance: dec!(10200),
                asset_balance: dec!(0),
            }
        );
        assert_eq!(account.balances(), (dec!(10200), dec!(0)));
    }

    #[test]
    fn test_execute_refusals() {
        let account = PaperAccount::new(dec!(1000));

        assert_eq!(
            account.execute(Decision::Buy, dec!(50000), dec!(0.1)).outcome,
            ExecutionOutcome::InsufficientFunds
        );
        assert_eq!(
            account.execute(Decision::Sell, dec!(50000), dec!(0.1)).outcome,
            ExecutionOutcome::InsufficientAssets
        );
        assert_eq!(
            account.execute(Decision::Hold, dec!(50000), dec!(0.1)).outcome,
            ExecutionOutcome::NoAction
        );
        assert_eq!(account.snapshot(), Portfolio::new(dec!(1000)));
    }

    #[test]
    fn test_clones_share_portfolio() {
        let account = PaperAccount::new(dec!(10000));
        let reader = account.clone();

        account.execute(Decision::Buy, dec!(100), dec!(1));
        assert!(reader.has_assets());
        assert_eq!(reader.snapshot().base_balance(), dec!(9900));
    }

    #[test]
    fn test_concurrent_readers_see_whole_trades() {
        let account = PaperAccount::new(dec!(10000));
        let price = dec!(100);

        let writer = {
            let account = account.clone();
            thread::spawn(move || {
                for i in 0..1000 {
                    if i % 2 == 0 {
                        account.execute(Decision::Buy, price, dec!(1));
                    } else {
                        account.execute(Decision::Sell, price, dec!(1));
                    }
                }
            })
        };

        for _ in 0..1000 {
            let snapshot = account.snapshot();
            assert_eq!(snapshot.total_value(price), dec!(10000));
        }

        writer.join().unwrap();
        assert_eq!(account.balances(), (dec!(10000), dec!(0)));
    }

    #[test]
    fn test_execution_balances_belong_to_its_trade() {
        let account = PaperAccount::new(dec!(10000));
        let price = dec!(100);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let account = account.clone();
                thread::spawn(move || {
                    (0..500)
                        .map(|i| {
                            let decision = if i % 2 == 0 { Decision::Buy } else { Decision::Sell };
                            account.execute(decision, price, dec!(1))
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            for execution in handle.join().unwrap() {
                // Base and asset always come from the same instant
                assert_eq!(execution.base_balance + execution.asset_balance * price, dec!(10000));
            }
        }
    }
}
