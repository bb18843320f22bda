//! Order value objects.

mod exec_type;
mod execution;
mod order_kind;
mod order_side;
mod order_status;
mod reasons;
mod time_in_force;

pub use exec_type::ExecType;
pub use execution::{Execution, Fill};
pub use order_kind::{OrderKind, Routing};
pub use order_side::OrderSide;
pub use order_status::OrderStatus;
pub use reasons::RejectReason;
pub use time_in_force::TimeInForce;
