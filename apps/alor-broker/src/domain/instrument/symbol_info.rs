//! Instrument metadata as published by the exchange.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::shared::{Board, Exchange, InstrumentId, Symbol};

/// Metadata for one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Exchange code.
    pub exchange: Exchange,
    /// Exchange symbol.
    pub symbol: Symbol,
    /// Home trading board.
    pub primary_board: Board,
    /// Units per lot.
    pub lot_size: Decimal,
    /// Minimum price increment.
    pub min_step: Decimal,
    /// Price-to-money multiplier (futures point value, 1 for stocks).
    #[serde(default = "default_price_multiplier")]
    pub price_multiplier: Decimal,
}

fn default_price_multiplier() -> Decimal {
    Decimal::ONE
}

impl SymbolInfo {
    /// Identity of the instrument.
    #[must_use]
    pub fn instrument(&self) -> InstrumentId {
        InstrumentId::new(self.exchange.clone(), self.symbol.clone())
    }

    /// Decimal places of the minimum price increment.
    ///
    /// `0.01` gives 2, `0.5` gives 1, `1` gives 0.
    #[must_use]
    pub fn decimals(&self) -> u32 {
        self.min_step.normalize().scale()
    }

    /// Whole lots contained in `size` units, ignoring the sign.
    #[must_use]
    pub fn lots(&self, size: Decimal) -> Decimal {
        if self.lot_size.is_zero() {
            return Decimal::ZERO;
        }
        (size.abs() / self.lot_size).round_dp_with_strategy(0, RoundingStrategy::ToZero)
    }

    /// Units contained in `lots` lots.
    #[must_use]
    pub fn units(&self, lots: Decimal) -> Decimal {
        lots * self.lot_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    fn info(lot_size: Decimal, min_step: Decimal) -> SymbolInfo {
        SymbolInfo {
            exchange: Exchange::new("MOEX"),
            symbol: Symbol::new("SBER"),
            primary_board: Board::new("TQBR"),
            lot_size,
            min_step,
            price_multiplier: Decimal::ONE,
        }
    }

    #[test_case(dec!(0.01), 2 ; "hundredths")]
    #[test_case(dec!(0.5), 1 ; "half")]
    #[test_case(dec!(0.0050), 3 ; "trailing zero")]
    #[test_case(dec!(1), 0 ; "whole")]
    #[test_case(dec!(10), 0 ; "tens")]
    fn decimals_follow_min_step(min_step: Decimal, expected: u32) {
        assert_eq!(info(dec!(10), min_step).decimals(), expected);
    }

    #[test_case(dec!(100), dec!(10) ; "exact")]
    #[test_case(dec!(-100), dec!(10) ; "sell side")]
    #[test_case(dec!(105), dec!(10) ; "floors")]
    #[test_case(dec!(9), dec!(0) ; "below one lot")]
    fn lots_floor_absolute_size(size: Decimal, expected: Decimal) {
        assert_eq!(info(dec!(10), dec!(0.01)).lots(size), expected);
    }

    #[test]
    fn instrument_identity() {
        assert_eq!(
            info(dec!(10), dec!(0.01)).instrument().data_name(),
            "MOEX.SBER"
        );
    }
}
