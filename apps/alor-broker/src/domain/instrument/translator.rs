//! Price translation between strategy units and exchange units.

use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeSet;

use super::SymbolInfo;
use crate::domain::shared::Board;

/// Bonds are quoted on the exchange in tenths relative to strategy prices.
pub const BOND_PRICE_FACTOR: Decimal = Decimal::TEN;

/// Converts prices in both directions.
///
/// Bond-board prices are scaled by [`BOND_PRICE_FACTOR`]; every exchange
/// price is rounded to the decimals of the instrument's minimum increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceTranslator {
    bond_boards: BTreeSet<Board>,
}

impl Default for PriceTranslator {
    fn default() -> Self {
        Self::new([Board::new("TQOB")])
    }
}

impl PriceTranslator {
    /// Translator treating the given boards as bond boards.
    #[must_use]
    pub fn new(bond_boards: impl IntoIterator<Item = Board>) -> Self {
        Self {
            bond_boards: bond_boards.into_iter().collect(),
        }
    }

    /// Returns true if prices on `board` are bond quotes.
    #[must_use]
    pub fn is_bond_board(&self, board: &Board) -> bool {
        self.bond_boards.contains(board)
    }

    /// Strategy price to exchange price.
    #[must_use]
    pub fn to_exchange_price(&self, info: &SymbolInfo, price: Decimal) -> Decimal {
        let scaled = if self.is_bond_board(&info.primary_board) {
            price * BOND_PRICE_FACTOR
        } else {
            price
        };
        scaled.round_dp_with_strategy(info.decimals(), RoundingStrategy::MidpointAwayFromZero)
    }

    /// Exchange price to strategy price.
    #[must_use]
    pub fn to_local_price(&self, info: &SymbolInfo, price: Decimal) -> Decimal {
        if self.is_bond_board(&info.primary_board) {
            (price / BOND_PRICE_FACTOR).normalize()
        } else {
            price.round_dp_with_strategy(info.decimals(), RoundingStrategy::MidpointAwayFromZero)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::{Exchange, Symbol};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn info(board: &str, min_step: Decimal) -> SymbolInfo {
        SymbolInfo {
            exchange: Exchange::new("MOEX"),
            symbol: Symbol::new("SU26238RMFS4"),
            primary_board: Board::new(board),
            lot_size: Decimal::ONE,
            min_step,
            price_multiplier: Decimal::ONE,
        }
    }

    #[test]
    fn bond_price_scales_both_ways() {
        let translator = PriceTranslator::default();
        let bond = info("TQOB", dec!(0.01));
        assert_eq!(translator.to_exchange_price(&bond, dec!(95.37)), dec!(953.70));
        assert_eq!(translator.to_local_price(&bond, dec!(953.70)), dec!(95.37));
    }

    #[test]
    fn non_bond_price_is_rounded_to_min_step_decimals() {
        let translator = PriceTranslator::default();
        let stock = info("TQBR", dec!(0.01));
        assert_eq!(translator.to_exchange_price(&stock, dec!(250.456)), dec!(250.46));
        assert_eq!(translator.to_local_price(&stock, dec!(250.45)), dec!(250.45));

        let future = info("RFUD", dec!(1));
        assert_eq!(translator.to_exchange_price(&future, dec!(72151.6)), dec!(72152));
    }

    #[test]
    fn bond_boards_are_configurable() {
        let translator = PriceTranslator::new([Board::new("EQOB")]);
        assert!(translator.is_bond_board(&Board::new("EQOB")));
        assert!(!translator.is_bond_board(&Board::new("TQOB")));
    }

    proptest! {
        #[test]
        fn bond_price_round_trips(cents in 1i64..=2_000_000) {
            let translator = PriceTranslator::default();
            let bond = info("TQOB", dec!(0.01));
            let price = Decimal::new(cents, 2);
            let back = translator.to_local_price(
                &bond,
                translator.to_exchange_price(&bond, price),
            );
            prop_assert_eq!(back, price.normalize());
        }

        #[test]
        fn stock_price_round_trips(cents in 1i64..=2_000_000) {
            let translator = PriceTranslator::default();
            let stock = info("TQBR", dec!(0.01));
            let price = Decimal::new(cents, 2);
            let back = translator.to_local_price(
                &stock,
                translator.to_exchange_price(&stock, price),
            );
            prop_assert_eq!(back, price);
        }
    }
}
