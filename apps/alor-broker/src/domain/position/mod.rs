//! Position Bounded Context
//!
//! Holdings and cash as seen by the strategy.

mod cash_value;
mod holding;

pub use cash_value::CashValue;
pub use holding::{Position, PositionChange};
