//! Application Ports (Driven)
//!
//! - [`ExchangePort`]: request/response calls to the exchange client
//! - [`PushEvent`]: unsolicited events delivered over the push channel

mod exchange;
mod push;

#[cfg(test)]
pub use exchange::MockExchangePort;
pub use exchange::{
    ExchangeError, ExchangePort, Money, NewOrder, PortfolioAccount, PositionSnapshot, StreamKind,
    Subscription,
};
pub use push::{
    Bar, BarUpdate, ConnectionEvent, ExchangeOrderStatus, OrderUpdate, PushEvent, PushReceiver,
    PushSender, TradeUpdate, push_channel,
};
