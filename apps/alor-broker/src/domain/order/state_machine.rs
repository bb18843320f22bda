//! Order State Machine
//!
//! Statuses only move forward: once terminal, an order never changes again.

use super::errors::OrderError;
use super::value_objects::OrderStatus;

/// Order State Machine for validating transitions.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Check if a state transition is valid.
    #[must_use]
    pub const fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            // From Created
            (OrderStatus::Created, OrderStatus::Submitted)
                | (OrderStatus::Created, OrderStatus::Rejected)
                | (OrderStatus::Created, OrderStatus::Canceled)
                // From Submitted
                | (OrderStatus::Submitted, OrderStatus::Accepted)
                | (OrderStatus::Submitted, OrderStatus::Rejected)
                // From Accepted
                | (OrderStatus::Accepted, OrderStatus::Partial)
                | (OrderStatus::Accepted, OrderStatus::Completed)
                | (OrderStatus::Accepted, OrderStatus::Canceled)
                | (OrderStatus::Accepted, OrderStatus::Rejected)
                | (OrderStatus::Accepted, OrderStatus::Margin)
                | (OrderStatus::Accepted, OrderStatus::Expired)
                // From Partial
                | (OrderStatus::Partial, OrderStatus::Partial)
                | (OrderStatus::Partial, OrderStatus::Completed)
                | (OrderStatus::Partial, OrderStatus::Canceled)
                | (OrderStatus::Partial, OrderStatus::Expired)
        )
    }

    /// Validate a state transition.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is invalid.
    pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(OrderError::InvalidStateTransition {
                from,
                to,
                reason: Self::transition_error_reason(from, to),
            })
        }
    }

    /// Get a human-readable reason for an invalid transition.
    #[must_use]
    pub fn transition_error_reason(from: OrderStatus, to: OrderStatus) -> String {
        match from {
            OrderStatus::Completed => format!("Order is already completed, cannot transition to {to}"),
            OrderStatus::Canceled => format!("Order is canceled, cannot transition to {to}"),
            OrderStatus::Rejected | OrderStatus::Margin => {
                format!("Order was rejected, cannot transition to {to}")
            }
            OrderStatus::Expired => format!("Order has expired, cannot transition to {to}"),
            _ => format!("Invalid transition from {from} to {to}"),
        }
    }

    /// Get all valid next states from a given state.
    #[must_use]
    pub fn valid_next_states(from: OrderStatus) -> Vec<OrderStatus> {
        match from {
            OrderStatus::Created => vec![
                OrderStatus::Submitted,
                OrderStatus::Rejected,
                OrderStatus::Canceled,
            ],
            OrderStatus::Submitted => vec![OrderStatus::Accepted, OrderStatus::Rejected],
            OrderStatus::Accepted => vec![
                OrderStatus::Partial,
                OrderStatus::Completed,
                OrderStatus::Canceled,
                OrderStatus::Rejected,
                OrderStatus::Margin,
                OrderStatus::Expired,
            ],
            OrderStatus::Partial => vec![
                OrderStatus::Partial,
                OrderStatus::Completed,
                OrderStatus::Canceled,
                OrderStatus::Expired,
            ],
            // Terminal states
            OrderStatus::Completed
            | OrderStatus::Canceled
            | OrderStatus::Expired
            | OrderStatus::Margin
            | OrderStatus::Rejected => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OrderStatus; 9] = [
        OrderStatus::Created,
        OrderStatus::Submitted,
        OrderStatus::Accepted,
        OrderStatus::Partial,
        OrderStatus::Completed,
        OrderStatus::Canceled,
        OrderStatus::Expired,
        OrderStatus::Margin,
        OrderStatus::Rejected,
    ];

    #[test]
    fn routing_path_is_valid() {
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::Created,
            OrderStatus::Submitted
        ));
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::Submitted,
            OrderStatus::Accepted
        ));
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::Accepted,
            OrderStatus::Partial
        ));
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::Partial,
            OrderStatus::Completed
        ));
    }

    #[test]
    fn cannot_skip_submission() {
        assert!(!OrderStateMachine::is_valid_transition(
            OrderStatus::Created,
            OrderStatus::Accepted
        ));
        assert!(!OrderStateMachine::is_valid_transition(
            OrderStatus::Created,
            OrderStatus::Completed
        ));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for from in ALL.into_iter().filter(OrderStatus::is_terminal) {
            assert!(OrderStateMachine::valid_next_states(from).is_empty());
            for to in ALL {
                assert!(!OrderStateMachine::is_valid_transition(from, to));
            }
        }
    }

    #[test]
    fn valid_next_states_agree_with_predicate() {
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    OrderStateMachine::valid_next_states(from).contains(&to),
                    OrderStateMachine::is_valid_transition(from, to),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn validate_transition_reports_reason() {
        let Err(err) =
            OrderStateMachine::validate_transition(OrderStatus::Completed, OrderStatus::Canceled)
        else {
            panic!("expected error");
        };
        assert!(err.to_string().contains("already completed"));
    }
}
