//! Shared kernel: identifiers used across bounded contexts.

mod identifiers;
mod instrument_id;

pub use identifiers::{
    AccountId, Board, Exchange, OrderNumber, OrderRef, PortfolioId, ServerCode, StrategyId,
    SubscriptionId, Symbol,
};
pub use instrument_id::{InstrumentId, InstrumentIdError};
