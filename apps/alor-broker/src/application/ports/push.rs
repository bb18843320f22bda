//! Push events delivered by the exchange client.
//!
//! The client's network task sends events into an unbounded channel; the
//! broker drains it on its own task, so every mutation of broker state
//! happens in one place.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::PositionSnapshot;
use crate::domain::order::OrderSide;
use crate::domain::shared::{Exchange, OrderNumber, SubscriptionId, Symbol};

/// Producer half of the push channel, owned by the exchange client.
pub type PushSender = mpsc::UnboundedSender<PushEvent>;

/// Consumer half of the push channel, owned by the broker.
pub type PushReceiver = mpsc::UnboundedReceiver<PushEvent>;

/// Create a push channel.
#[must_use]
pub fn push_channel() -> (PushSender, PushReceiver) {
    mpsc::unbounded_channel()
}

/// One OHLCV bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time.
    pub time: DateTime<Utc>,
    /// Open.
    pub open: Decimal,
    /// High.
    pub high: Decimal,
    /// Low.
    pub low: Decimal,
    /// Close.
    pub close: Decimal,
    /// Volume.
    pub volume: Decimal,
}

/// New bar on a bar subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarUpdate {
    /// Subscription the bar belongs to.
    pub subscription: SubscriptionId,
    /// The bar.
    pub bar: Bar,
}

/// A trade against one of the client's orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeUpdate {
    /// Number of the order that traded.
    pub order_number: OrderNumber,
    /// Exchange code.
    pub exchange: Exchange,
    /// Symbol.
    pub symbol: Symbol,
    /// Trade side.
    pub side: OrderSide,
    /// Unsigned quantity in units.
    pub quantity_units: Decimal,
    /// Price per unit, exchange units.
    pub price: Decimal,
    /// Trade time.
    pub timestamp: DateTime<Utc>,
}

/// Order status as reported by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeOrderStatus {
    /// Working on the book.
    Working,
    /// Fully filled.
    Filled,
    /// Canceled.
    Canceled,
    /// Rejected.
    Rejected,
    /// Expired.
    Expired,
}

/// Order or stop-order status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    /// Exchange order number.
    pub order_number: OrderNumber,
    /// Exchange code.
    pub exchange: Exchange,
    /// New status.
    pub status: ExchangeOrderStatus,
}

/// Push-channel connection lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ConnectionEvent {
    /// Connection loop starting.
    Entering,
    /// Socket connected.
    Connected,
    /// Subscriptions being restored after a reconnect.
    Resubscribe {
        /// Subscriptions to restore.
        count: usize,
    },
    /// Ready to receive.
    Ready,
    /// Socket closed.
    Disconnected,
    /// No data within the keep-alive window.
    Timeout,
    /// Transport error.
    Error {
        /// Error details.
        message: String,
    },
    /// Connection loop finished.
    Exit,
}

/// Unsolicited event from the exchange client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    /// New bar.
    NewBar(BarUpdate),
    /// Position or money change.
    Position(PositionSnapshot),
    /// Trade.
    Trade(TradeUpdate),
    /// Regular order update.
    Order(OrderUpdate),
    /// Stop-order update.
    StopOrder(OrderUpdate),
    /// Connection lifecycle.
    Connection(ConnectionEvent),
}

impl PushEvent {
    /// Metrics label.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NewBar(_) => "new_bar",
            Self::Position(_) => "position",
            Self::Trade(_) => "trade",
            Self::Order(_) => "order",
            Self::StopOrder(_) => "stop_order",
            Self::Connection(_) => "connection",
        }
    }
}
