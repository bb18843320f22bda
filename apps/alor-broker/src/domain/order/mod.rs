//! Order Bounded Context
//!
//! The order aggregate and its lifecycle.
//!
//! # Lifecycle
//!
//! ```text
//! Created -> Submitted -> Accepted -> Partial -> Completed
//!    |           |           |          |
//!    |           v           +--------> Canceled / Expired
//!    +------> Rejected       +--------> Rejected / Margin
//!    +------> Canceled (held orders only)
//! ```

mod aggregate;
mod errors;
mod request;
mod state_machine;
pub mod value_objects;

pub use aggregate::Order;
pub use errors::OrderError;
pub use request::OrderRequest;
pub use state_machine::OrderStateMachine;
pub use value_objects::{
    ExecType, Execution, Fill, OrderKind, OrderSide, OrderStatus, RejectReason, Routing,
    TimeInForce,
};
