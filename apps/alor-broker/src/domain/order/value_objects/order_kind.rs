//! Validated order kind and routing binding.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::{Board, PortfolioId, ServerCode};

/// Routable order kind with exactly the fields each kind needs.
///
/// Prices here are in local (strategy) units; conversion to exchange units
/// happens when the order is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    /// Market order.
    Market,
    /// Limit order.
    Limit {
        /// Limit price.
        price: Decimal,
    },
    /// Stop (stop-market) order.
    Stop {
        /// Trigger price.
        trigger: Decimal,
        /// Trading server that holds the stop.
        server: ServerCode,
    },
    /// Stop-limit order.
    StopLimit {
        /// Trigger price.
        trigger: Decimal,
        /// Limit price once triggered.
        limit: Decimal,
        /// Trading server that holds the stop.
        server: ServerCode,
    },
}

impl OrderKind {
    /// Returns true if the order lives on the stop-order book.
    #[must_use]
    pub const fn is_stop(&self) -> bool {
        matches!(self, Self::Stop { .. } | Self::StopLimit { .. })
    }

    /// Trading server for stop kinds.
    #[must_use]
    pub const fn server(&self) -> Option<&ServerCode> {
        match self {
            Self::Market | Self::Limit { .. } => None,
            Self::Stop { server, .. } | Self::StopLimit { server, .. } => Some(server),
        }
    }

    /// Metrics label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit { .. } => "limit",
            Self::Stop { .. } => "stop",
            Self::StopLimit { .. } => "stop_limit",
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "MARKET"),
            Self::Limit { price } => write!(f, "LIMIT @ {price}"),
            Self::Stop { trigger, server } => write!(f, "STOP @ {trigger} on {server}"),
            Self::StopLimit {
                trigger,
                limit,
                server,
            } => write!(f, "STOP_LIMIT @ {trigger} -> {limit} on {server}"),
        }
    }
}

/// Everything needed to route a validated order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routing {
    /// Portfolio the order is placed under.
    pub portfolio: PortfolioId,
    /// Board the instrument trades on.
    pub board: Board,
    /// Validated kind.
    pub kind: OrderKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn stop_kinds_carry_server() {
        let stop = OrderKind::Stop {
            trigger: dec!(250),
            server: ServerCode::new("TRADE"),
        };
        assert!(stop.is_stop());
        assert_eq!(stop.server().map(ServerCode::as_str), Some("TRADE"));

        let limit = OrderKind::Limit { price: dec!(250) };
        assert!(!limit.is_stop());
        assert!(limit.server().is_none());
    }

    #[test]
    fn labels() {
        assert_eq!(OrderKind::Market.label(), "market");
        assert_eq!(
            OrderKind::StopLimit {
                trigger: dec!(1),
                limit: dec!(1),
                server: ServerCode::new("TRADE"),
            }
            .label(),
            "stop_limit"
        );
    }
}
