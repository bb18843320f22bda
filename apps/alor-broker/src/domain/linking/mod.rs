//! Linked Orders Bounded Context
//!
//! One-cancels-other pairs and bracket chains, plus the reconciliation
//! that decides which linked orders to cancel or activate when an order
//! reaches a terminal status.

mod bracket;
mod registry;

pub use bracket::{BracketError, BracketRequest};
pub use registry::{LinkAction, LinkedOrders, Transition};
