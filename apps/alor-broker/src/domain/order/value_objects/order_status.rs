//! Order status in the lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status.
///
/// `Created` orders exist only locally (held bracket members or orders that
/// failed validation). `Submitted` and `Accepted` are set while routing;
/// everything after that is driven by push events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Created locally, not sent to the exchange.
    Created,
    /// Creation call issued to the exchange.
    Submitted,
    /// Exchange assigned an order number.
    Accepted,
    /// Partially executed.
    Partial,
    /// Fully executed.
    Completed,
    /// Canceled (confirmed by the exchange, or never routed).
    Canceled,
    /// Expired on the exchange.
    Expired,
    /// Rejected for insufficient margin.
    Margin,
    /// Rejected by validation or by the exchange.
    Rejected,
}

impl OrderStatus {
    /// Returns true if the order is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Canceled | Self::Expired | Self::Margin | Self::Rejected
        )
    }

    /// Returns true if the order is still alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the order is working on the exchange.
    #[must_use]
    pub const fn is_working(&self) -> bool {
        matches!(self, Self::Submitted | Self::Accepted | Self::Partial)
    }

    /// Returns true if the order can receive fills.
    #[must_use]
    pub const fn can_fill(&self) -> bool {
        matches!(self, Self::Accepted | Self::Partial)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "CREATED"),
            Self::Submitted => write!(f, "SUBMITTED"),
            Self::Accepted => write!(f, "ACCEPTED"),
            Self::Partial => write!(f, "PARTIAL"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Canceled => write!(f, "CANCELED"),
            Self::Expired => write!(f, "EXPIRED"),
            Self::Margin => write!(f, "MARGIN"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_is_terminal() {
        assert!(!OrderStatus::Created.is_terminal());
        assert!(!OrderStatus::Submitted.is_terminal());
        assert!(!OrderStatus::Accepted.is_terminal());
        assert!(!OrderStatus::Partial.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Canceled.is_terminal());
        assert!(OrderStatus::Expired.is_terminal());
        assert!(OrderStatus::Margin.is_terminal());
        assert!(OrderStatus::Rejected.is_terminal());
    }

    #[test]
    fn order_status_is_working() {
        assert!(!OrderStatus::Created.is_working());
        assert!(OrderStatus::Submitted.is_working());
        assert!(OrderStatus::Partial.is_working());
        assert!(!OrderStatus::Completed.is_working());
    }

    #[test]
    fn order_status_can_fill() {
        assert!(OrderStatus::Accepted.can_fill());
        assert!(OrderStatus::Partial.can_fill());
        assert!(!OrderStatus::Submitted.can_fill());
        assert!(!OrderStatus::Canceled.can_fill());
    }

    #[test]
    fn order_status_display() {
        assert_eq!(OrderStatus::Partial.to_string(), "PARTIAL");
        assert_eq!(OrderStatus::Margin.to_string(), "MARGIN");
    }
}
