//! Trade direction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an order or trade. Serialized the way the exchange spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Increases the position.
    Buy,
    /// Decreases the position.
    Sell,
}

impl OrderSide {
    /// Side that closes a position opened on this side.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// `quantity` with the sign of this side (buy positive, sell negative).
    /// The sign of the input is ignored.
    #[must_use]
    pub fn signed(&self, quantity: Decimal) -> Decimal {
        let magnitude = quantity.abs();
        match self {
            Self::Buy => magnitude,
            Self::Sell => -magnitude,
        }
    }

    /// Exchange spelling, also used as a metrics label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
