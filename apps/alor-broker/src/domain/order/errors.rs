//! Order errors.

use std::fmt;

use super::value_objects::OrderStatus;
use crate::domain::shared::OrderRef;

/// Errors raised by the order aggregate.
///
/// These never reach the strategy: the broker logs them and drops the
/// offending push event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Invalid state transition attempted.
    InvalidStateTransition {
        /// Current order status.
        from: OrderStatus,
        /// Attempted status.
        to: OrderStatus,
        /// Reason for failure.
        reason: String,
    },

    /// Order cannot be filled in current state.
    CannotFill {
        /// Current status.
        status: OrderStatus,
    },

    /// Fill size exceeds the size still to execute.
    FillExceedsRemaining {
        /// Unsigned fill size.
        fill: String,
        /// Unsigned remaining size.
        remaining: String,
    },

    /// Order not tracked locally.
    NotFound {
        /// Order reference.
        reference: OrderRef,
    },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStateTransition { from, to, reason } => {
                write!(
                    f,
                    "Invalid order state transition: {from} -> {to}: {reason}"
                )
            }
            Self::CannotFill { status } => {
                write!(f, "Cannot fill order in status: {status}")
            }
            Self::FillExceedsRemaining { fill, remaining } => {
                write!(f, "Fill size {fill} exceeds remaining {remaining}")
            }
            Self::NotFound { reference } => {
                write!(f, "Order not found: {reference}")
            }
        }
    }
}

impl std::error::Error for OrderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_transition_display() {
        let err = OrderError::InvalidStateTransition {
            from: OrderStatus::Created,
            to: OrderStatus::Completed,
            reason: "Order must be accepted first".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("CREATED"));
        assert!(msg.contains("COMPLETED"));
    }

    #[test]
    fn fill_exceeds_remaining_display() {
        let err = OrderError::FillExceedsRemaining {
            fill: "20".to_string(),
            remaining: "10".to_string(),
        };
        assert_eq!(err.to_string(), "Fill size 20 exceeds remaining 10");
    }

    #[test]
    fn not_found_display() {
        let err = OrderError::NotFound {
            reference: OrderRef::new(3),
        };
        assert_eq!(err.to_string(), "Order not found: #3");
    }
}
