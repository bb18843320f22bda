//! Position with weighted-average merge.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Signed holding with average entry price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Signed size in units, negative for short.
    pub size: Decimal,
    /// Average entry price.
    pub price: Decimal,
}

/// Result of merging a trade into a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionChange {
    /// Size after the merge.
    pub size: Decimal,
    /// Average price after the merge.
    pub price: Decimal,
    /// Part of the trade that opened or extended the position.
    pub opened: Decimal,
    /// Part of the trade that reduced the position (sign of the trade).
    pub closed: Decimal,
    /// Realised P&L of the closed part.
    pub pnl: Decimal,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub const fn new(size: Decimal, price: Decimal) -> Self {
        Self { size, price }
    }

    /// Returns true if flat.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.size.is_zero()
    }

    /// Merge a signed trade.
    ///
    /// Extending keeps a weighted average price, reducing keeps the entry
    /// price, and flipping through zero restarts at the trade price.
    pub fn update(&mut self, size: Decimal, price: Decimal) -> PositionChange {
        let old_size = self.size;
        let old_price = self.price;
        self.size += size;

        let (opened, closed) = if self.size.is_zero() {
            self.price = Decimal::ZERO;
            (Decimal::ZERO, size)
        } else if old_size.is_zero() {
            self.price = price;
            (size, Decimal::ZERO)
        } else if old_size.is_sign_positive() == size.is_sign_positive() {
            self.price = (old_price * old_size + price * size) / self.size;
            (size, Decimal::ZERO)
        } else if self.size.is_sign_positive() == old_size.is_sign_positive() {
            (Decimal::ZERO, size)
        } else {
            self.price = price;
            (self.size, -old_size)
        };

        PositionChange {
            size: self.size,
            price: self.price,
            opened,
            closed,
            pnl: -closed * (price - old_price),
        }
    }
}
