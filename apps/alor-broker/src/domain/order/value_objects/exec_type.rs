//! Execution type requested by the strategy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution type as requested by the strategy layer.
///
/// The strategy API accepts the full set of types, but only
/// [`ExecType::is_routable`] ones can reach the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecType {
    /// Execute at the best available price.
    Market,
    /// Execute at the given price or better.
    Limit,
    /// Market order once the trigger price trades.
    Stop,
    /// Limit order once the trigger price trades.
    StopLimit,
    /// Execute at the session close.
    Close,
    /// Trailing stop.
    StopTrail,
    /// Trailing stop with limit.
    StopTrailLimit,
    /// Replay of a historical order.
    Historical,
}

impl ExecType {
    /// Returns true if the exchange accepts this type.
    #[must_use]
    pub const fn is_routable(&self) -> bool {
        matches!(self, Self::Market | Self::Limit | Self::Stop | Self::StopLimit)
    }

    /// Returns true if a price (limit or trigger) is required.
    #[must_use]
    pub const fn requires_price(&self) -> bool {
        !matches!(self, Self::Market)
    }

    /// Returns true if a secondary limit price is required.
    #[must_use]
    pub const fn requires_price_limit(&self) -> bool {
        matches!(self, Self::StopLimit | Self::StopTrailLimit)
    }

    /// Returns true if the order lives on the stop-order book.
    #[must_use]
    pub const fn is_stop(&self) -> bool {
        matches!(
            self,
            Self::Stop | Self::StopLimit | Self::StopTrail | Self::StopTrailLimit
        )
    }
}

impl fmt::Display for ExecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit => write!(f, "LIMIT"),
            Self::Stop => write!(f, "STOP"),
            Self::StopLimit => write!(f, "STOP_LIMIT"),
            Self::Close => write!(f, "CLOSE"),
            Self::StopTrail => write!(f, "STOP_TRAIL"),
            Self::StopTrailLimit => write!(f, "STOP_TRAIL_LIMIT"),
            Self::Historical => write!(f, "HISTORICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routable_types() {
        assert!(ExecType::Market.is_routable());
        assert!(ExecType::Limit.is_routable());
        assert!(ExecType::Stop.is_routable());
        assert!(ExecType::StopLimit.is_routable());
        assert!(!ExecType::Close.is_routable());
        assert!(!ExecType::StopTrail.is_routable());
        assert!(!ExecType::StopTrailLimit.is_routable());
        assert!(!ExecType::Historical.is_routable());
    }

    #[test]
    fn price_requirements() {
        assert!(!ExecType::Market.requires_price());
        assert!(ExecType::Limit.requires_price());
        assert!(ExecType::StopLimit.requires_price_limit());
        assert!(!ExecType::Stop.requires_price_limit());
    }

    #[test]
    fn display_matches_serde() {
        assert_eq!(ExecType::StopLimit.to_string(), "STOP_LIMIT");
        assert_eq!(
            serde_json::to_string(&ExecType::StopLimit).unwrap(),
            "\"STOP_LIMIT\""
        );
    }
}
