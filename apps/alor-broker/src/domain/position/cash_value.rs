//! Free cash and non-cash value for one (portfolio, exchange) pair.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Free cash and the value held outside cash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashValue {
    /// Free cash.
    pub cash: Decimal,
    /// Value of positions (equity minus cash).
    pub value: Decimal,
}

impl CashValue {
    /// Create a cash/value pair.
    #[must_use]
    pub const fn new(cash: Decimal, value: Decimal) -> Self {
        Self { cash, value }
    }

    /// Pair derived from total equity and free cash, both rounded to
    /// kopecks.
    #[must_use]
    pub fn from_equity(equity: Decimal, cash: Decimal) -> Self {
        Self {
            cash: cash.round_dp(2),
            value: (equity - cash).round_dp(2),
        }
    }

    /// Cash plus value.
    #[must_use]
    pub fn equity(&self) -> Decimal {
        self.cash + self.value
    }
}

impl Add for CashValue {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            cash: self.cash + rhs.cash,
            value: self.value + rhs.value,
        }
    }
}

impl std::iter::Sum for CashValue {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}
