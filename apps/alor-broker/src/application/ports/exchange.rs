//! Exchange Port (Driven Port)
//!
//! Interface of the exchange client: instrument metadata, account
//! snapshots, push subscriptions, and order entry.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::instrument::SymbolInfo;
use crate::domain::order::{OrderSide, TimeInForce};
use crate::domain::shared::{
    AccountId, Board, Exchange, OrderNumber, PortfolioId, ServerCode, SubscriptionId, Symbol,
};

/// Push stream classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamKind {
    /// Position and money updates.
    Positions,
    /// Trades.
    Trades,
    /// Regular order updates.
    Orders,
    /// Stop-order updates.
    StopOrders,
    /// New bars for a data feed.
    Bars,
}

impl StreamKind {
    /// Streams the broker manages for every traded (portfolio, exchange).
    pub const MANAGED: [Self; 4] = [Self::Positions, Self::Trades, Self::Orders, Self::StopOrders];

    /// Returns true if the broker manages this stream.
    #[must_use]
    pub const fn is_managed(&self) -> bool {
        !matches!(self, Self::Bars)
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positions => write!(f, "POSITIONS"),
            Self::Trades => write!(f, "TRADES"),
            Self::Orders => write!(f, "ORDERS"),
            Self::StopOrders => write!(f, "STOP_ORDERS"),
            Self::Bars => write!(f, "BARS"),
        }
    }
}

/// A live push registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Registration identifier.
    pub id: SubscriptionId,
    /// Stream class.
    pub kind: StreamKind,
    /// Portfolio the stream is scoped to.
    pub portfolio: PortfolioId,
    /// Exchange the stream is scoped to.
    pub exchange: Exchange,
}

/// Portfolio with its trading account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioAccount {
    /// Portfolio code.
    pub portfolio: PortfolioId,
    /// Trading account.
    pub account: AccountId,
}

/// Money snapshot for one (portfolio, exchange).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Money {
    /// Total equity of the portfolio.
    pub portfolio: Decimal,
    /// Free cash.
    pub cash: Decimal,
}

/// Position as reported by snapshots and position pushes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// Portfolio code.
    pub portfolio: PortfolioId,
    /// Exchange code.
    pub exchange: Exchange,
    /// Symbol (currency code for cash).
    pub symbol: Symbol,
    /// Cash balance rather than an instrument.
    pub is_currency: bool,
    /// Quantity in lots.
    pub qty_lots: Decimal,
    /// Position volume at entry prices (cash amount for currencies).
    pub volume: Decimal,
    /// Unrealised P&L in price points.
    #[serde(default)]
    pub unrealised_pl: Decimal,
}

/// Fields shared by every order creation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Trading account.
    pub account: AccountId,
    /// Portfolio code.
    pub portfolio: PortfolioId,
    /// Exchange code.
    pub exchange: Exchange,
    /// Symbol.
    pub symbol: Symbol,
    /// Board.
    pub board: Board,
    /// Side; quantity is always unsigned.
    pub side: OrderSide,
    /// Quantity in whole lots.
    pub quantity: Decimal,
    /// Time in force.
    pub time_in_force: TimeInForce,
}

/// Exchange port error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExchangeError {
    /// Network or connection failure.
    #[error("Exchange transport error: {message}")]
    Transport {
        /// Error details.
        message: String,
    },

    /// The exchange answered with an error.
    #[error("Exchange service error: {message}")]
    Service {
        /// Error details.
        message: String,
    },

    /// The exchange refused the request.
    #[error("Rejected by exchange: {reason}")]
    Rejected {
        /// Rejection reason.
        reason: String,
    },

    /// Referenced entity is unknown to the exchange.
    #[error("Not found on exchange: {what}")]
    NotFound {
        /// What was looked up.
        what: String,
    },
}

impl ExchangeError {
    /// Transport failure.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Service failure.
    #[must_use]
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }
}

/// Port for the exchange client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangePort: Send + Sync {
    /// Instrument metadata, `None` if the exchange does not know it.
    async fn symbol_info(
        &self,
        exchange: &Exchange,
        symbol: &Symbol,
    ) -> Result<Option<SymbolInfo>, ExchangeError>;

    /// Portfolios available to the client with their accounts.
    async fn portfolios(&self) -> Result<Vec<PortfolioAccount>, ExchangeError>;

    /// Money snapshot.
    async fn money(
        &self,
        portfolio: &PortfolioId,
        exchange: &Exchange,
    ) -> Result<Money, ExchangeError>;

    /// All positions, cash included.
    async fn positions(
        &self,
        portfolio: &PortfolioId,
        exchange: &Exchange,
    ) -> Result<Vec<PositionSnapshot>, ExchangeError>;

    /// Single position, `None` when flat.
    async fn position(
        &self,
        portfolio: &PortfolioId,
        exchange: &Exchange,
        symbol: &Symbol,
    ) -> Result<Option<PositionSnapshot>, ExchangeError>;

    /// Register a push stream.
    async fn subscribe(
        &self,
        kind: StreamKind,
        portfolio: &PortfolioId,
        exchange: &Exchange,
    ) -> Result<SubscriptionId, ExchangeError>;

    /// Drop a push stream.
    async fn unsubscribe(&self, id: &SubscriptionId) -> Result<(), ExchangeError>;

    /// Live subscription table kept by the client.
    fn subscriptions(&self) -> Vec<Subscription>;

    /// Place a market order.
    async fn create_market_order(&self, order: &NewOrder) -> Result<OrderNumber, ExchangeError>;

    /// Place a limit order at `price` (exchange units).
    async fn create_limit_order(
        &self,
        order: &NewOrder,
        price: Decimal,
    ) -> Result<OrderNumber, ExchangeError>;

    /// Place a stop-market order triggered at `trigger` (exchange units).
    async fn create_stop_order(
        &self,
        order: &NewOrder,
        trigger: Decimal,
        server: &ServerCode,
    ) -> Result<OrderNumber, ExchangeError>;

    /// Place a stop-limit order.
    async fn create_stop_limit_order(
        &self,
        order: &NewOrder,
        trigger: Decimal,
        limit: Decimal,
        server: &ServerCode,
    ) -> Result<OrderNumber, ExchangeError>;

    /// Cancel a regular order.
    async fn cancel_order(
        &self,
        portfolio: &PortfolioId,
        exchange: &Exchange,
        number: &OrderNumber,
    ) -> Result<(), ExchangeError>;

    /// Cancel a stop order.
    async fn cancel_stop_order(
        &self,
        server: &ServerCode,
        portfolio: &PortfolioId,
        number: &OrderNumber,
    ) -> Result<(), ExchangeError>;
}
