//! Two-balance paper portfolio.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Portfolio holding a base currency balance and a single asset balance.
///
/// Balances only change through [`Portfolio::buy`] and [`Portfolio::sell`],
/// and neither can go negative. A successful trade at `price` preserves
/// `base_balance + asset_balance * price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    base_balance: Decimal,
    asset_balance: Decimal,
    initial_base_balance: Decimal,
    /// Zero until the first trade.
    last_traded_price: Decimal,
}

impl Portfolio {
    /// Create a new portfolio funded with `initial_base_balance`.
    pub fn new(initial_base_balance: Decimal) -> Self {
        let initial_base_balance = initial_base_balance.max(Decimal::ZERO);
        Self {
            base_balance: initial_base_balance,
            asset_balance: Decimal::ZERO,
            initial_base_balance,
            last_traded_price: Decimal::ZERO,
        }
    }

    /// Buy `amount` of the asset at `price`.
    ///
    /// Returns `false` without touching the balances if the cost exceeds the
    /// base balance or the arguments are not positive.
    pub fn buy(&mut self, price: Decimal, amount: Decimal) -> bool {
        if price <= Decimal::ZERO || amount <= Decimal::ZERO {
            return false;
        }
        let cost = match price.checked_mul(amount) {
            Some(cost) => cost,
            None => return false,
        };
        if cost > self.base_balance {
            return false;
        }

        self.base_balance -= cost;
        self.asset_balance += amount;
        self.last_traded_price = price;
        true
    }

    /// Sell `amount` of the asset at `price`.
    ///
    /// Returns `false` without touching the balances if `amount` exceeds the
    /// asset balance or the arguments are not positive.
    pub fn sell(&mut self, price: Decimal, amount: Decimal) -> bool {
        if price <= Decimal::ZERO || amount <= Decimal::ZERO {
            return false;
        }
        if amount > self.asset_balance {
            return false;
        }
        let proceeds = match price.checked_mul(amount) {
            Some(proceeds) => proceeds,
            None => return false,
        };

        self.asset_balance -= amount;
        self.base_balance += proceeds;
        self.last_traded_price = price;
        true
    }

    /// Total value in base currency at `price`.
    pub fn total_value(&self, price: Decimal) -> Decimal {
        self.base_balance + self.asset_balance * price
    }

    /// Profit and loss at `price` as a percentage of the initial balance.
    pub fn pnl_percent(&self, price: Decimal) -> Decimal {
        if self.initial_base_balance == Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.total_value(price) - self.initial_base_balance) / self.initial_base_balance
            * Decimal::ONE_HUNDRED
    }

    /// Available base currency.
    pub fn base_balance(&self) -> Decimal {
        self.base_balance
    }

    /// Asset held.
    pub fn asset_balance(&self) -> Decimal {
        self.asset_balance
    }

    /// Base currency the portfolio was funded with.
    pub fn initial_base_balance(&self) -> Decimal {
        self.initial_base_balance
    }

    /// Price of the last executed trade, `None` before the first trade.
    pub fn last_traded_price(&self) -> Option<Decimal> {
        (self.last_traded_price > Decimal::ZERO).then_some(self.last_traded_price)
    }

    /// Check if any asset is held.
    pub fn has_assets(&self) -> bool {
        self.asset_balance > Decimal::ZERO
    }
}

impl fmt::Display for Portfolio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let price = self.last_traded_price;
        write!(
            f,
            "Portfolio{{base={:.2}, asset={:.4}, total={:.2}, pnl={:.2}%}}",
            self.base_balance,
            self.asset_balance,
            self.total_value(price),
            self.pnl_percent(price)
        )
    }
}
