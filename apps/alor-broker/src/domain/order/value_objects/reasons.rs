//! Reasons for order rejection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason an order was rejected, by validation or by the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RejectReason {
    /// Stable rejection code, used as a metrics label.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl RejectReason {
    /// Create a new reject reason.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Execution type the exchange cannot route.
    #[must_use]
    pub fn unsupported_order_type(exec_type: impl fmt::Display) -> Self {
        Self::new(
            "UNSUPPORTED_ORDER_TYPE",
            format!("Unsupported order type: {exec_type}"),
        )
    }

    /// Instrument metadata could not be resolved.
    #[must_use]
    pub fn instrument_not_found(instrument: impl fmt::Display) -> Self {
        Self::new(
            "INSTRUMENT_NOT_FOUND",
            format!("Instrument not found: {instrument}"),
        )
    }

    /// No portfolio bound to the order or its board.
    #[must_use]
    pub fn portfolio_not_found(board: impl fmt::Display) -> Self {
        Self::new(
            "PORTFOLIO_NOT_FOUND",
            format!("Portfolio not found for board {board}"),
        )
    }

    /// Limit order without a price.
    #[must_use]
    pub fn limit_price_missing() -> Self {
        Self::new("PRICE_REQUIRED", "Limit price required for a limit order")
    }

    /// Stop order without a trigger price.
    #[must_use]
    pub fn trigger_price_missing() -> Self {
        Self::new("PRICE_REQUIRED", "Trigger price required for a stop order")
    }

    /// Stop-limit order without the secondary limit price.
    #[must_use]
    pub fn price_limit_missing() -> Self {
        Self::new(
            "PRICE_LIMIT_REQUIRED",
            "Limit price required for a stop-limit order",
        )
    }

    /// No trading server bound to the order or its board.
    #[must_use]
    pub fn server_not_found(board: impl fmt::Display) -> Self {
        Self::new(
            "SERVER_NOT_FOUND",
            format!("Trading server not found for board {board}"),
        )
    }

    /// Declared parent is not the head of a registered chain.
    #[must_use]
    pub fn parent_not_found(parent: impl fmt::Display) -> Self {
        Self::new(
            "PARENT_NOT_FOUND",
            format!("Parent order not found: {parent}"),
        )
    }

    /// Requested size rounds down to zero lots.
    #[must_use]
    pub fn size_below_lot(lot_size: impl fmt::Display) -> Self {
        Self::new(
            "SIZE_BELOW_LOT",
            format!("Size below one lot of {lot_size}"),
        )
    }

    /// Portfolio has no trading account.
    #[must_use]
    pub fn account_not_found(portfolio: impl fmt::Display) -> Self {
        Self::new(
            "ACCOUNT_NOT_FOUND",
            format!("Account not found for portfolio {portfolio}"),
        )
    }

    /// The exchange returned no usable result.
    #[must_use]
    pub fn exchange_error(message: impl Into<String>) -> Self {
        Self::new("EXCHANGE_ERROR", message)
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_messages_name_the_price_kind() {
        assert!(RejectReason::limit_price_missing().message.contains("Limit price"));
        assert!(RejectReason::trigger_price_missing().message.contains("Trigger price"));
        assert_eq!(
            RejectReason::limit_price_missing().code,
            RejectReason::trigger_price_missing().code
        );
    }

    #[test]
    fn display_includes_code() {
        let reason = RejectReason::portfolio_not_found("TQBR");
        assert_eq!(
            reason.to_string(),
            "[PORTFOLIO_NOT_FOUND] Portfolio not found for board TQBR"
        );
    }
}
