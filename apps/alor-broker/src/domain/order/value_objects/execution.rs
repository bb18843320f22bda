//! Execution state of an order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single trade against an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    /// Signed size (negative for sells).
    pub size: Decimal,
    /// Price per unit, local units.
    pub price: Decimal,
    /// Trade time.
    pub at: DateTime<Utc>,
    /// Size that opened or extended the position.
    pub opened: Decimal,
    /// Size that closed or reduced the position.
    pub closed: Decimal,
    /// Realised P&L of the closed part.
    pub pnl: Decimal,
}

/// Accumulated executions.
///
/// `remaining` is the unsigned size still to execute. It starts at the
/// requested size and is narrowed to the lot-rounded routed size when the
/// order is placed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Execution {
    /// Signed executed size.
    pub size: Decimal,
    /// Average execution price.
    pub price: Decimal,
    /// Unsigned size still to execute.
    pub remaining: Decimal,
    /// Executed notional (`|size| × price`).
    pub value: Decimal,
    /// Realised P&L across fills.
    pub pnl: Decimal,
    /// Time of the last fill.
    pub last_fill_at: Option<DateTime<Utc>>,
    /// Individual fills in arrival order.
    pub fills: Vec<Fill>,
}

impl Execution {
    /// Execution state for an order of the given unsigned size.
    #[must_use]
    pub fn new(remaining: Decimal) -> Self {
        Self {
            remaining: remaining.abs(),
            ..Self::default()
        }
    }

    /// Returns true if nothing has been executed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }

    /// Record a fill.
    pub fn record(&mut self, fill: Fill) {
        let new_size = self.size + fill.size;
        if !new_size.is_zero() {
            self.price = (self.price * self.size.abs() + fill.price * fill.size.abs())
                / new_size.abs();
        }
        self.size = new_size;
        self.remaining -= fill.size.abs();
        self.value += fill.price * fill.size.abs();
        self.pnl += fill.pnl;
        self.last_fill_at = Some(fill.at);
        self.fills.push(fill);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fill(size: Decimal, price: Decimal) -> Fill {
        Fill {
            size,
            price,
            at: Utc::now(),
            opened: size,
            closed: Decimal::ZERO,
            pnl: Decimal::ZERO,
        }
    }

    #[test]
    fn record_averages_price() {
        let mut execution = Execution::new(dec!(20));
        execution.record(fill(dec!(10), dec!(100)));
        execution.record(fill(dec!(10), dec!(110)));

        assert_eq!(execution.size, dec!(20));
        assert_eq!(execution.price, dec!(105));
        assert_eq!(execution.remaining, Decimal::ZERO);
        assert_eq!(execution.value, dec!(2100));
        assert_eq!(execution.fills.len(), 2);
    }

    #[test]
    fn sell_fills_reduce_remaining_by_magnitude() {
        let mut execution = Execution::new(dec!(-30));
        assert_eq!(execution.remaining, dec!(30));
        execution.record(fill(dec!(-10), dec!(50)));
        assert_eq!(execution.size, dec!(-10));
        assert_eq!(execution.remaining, dec!(20));
        assert_eq!(execution.price, dec!(50));
    }
}
