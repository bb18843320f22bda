//! Paper Exchange
//!
//! In-memory [`ExchangePort`] that keeps its own order book, positions,
//! and money, and reports every change over the push channel the way the
//! live client does. Used for paper sessions and by the integration tests.

mod book;

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use book::{PaperOrder, PaperOrderKind, PaperOrderState};

use crate::application::ports::{
    ExchangeError, ExchangeOrderStatus, ExchangePort, Money, NewOrder, OrderUpdate,
    PortfolioAccount, PositionSnapshot, PushEvent, PushSender, StreamKind, Subscription,
    TradeUpdate,
};
use crate::domain::instrument::SymbolInfo;
use crate::domain::position::Position;
use crate::domain::shared::{
    AccountId, Exchange, OrderNumber, PortfolioId, ServerCode, SubscriptionId, Symbol,
};

/// Currency symbol used for cash snapshots.
const CASH_SYMBOL: &str = "RUB";

/// A request received by the paper exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperCall {
    /// Push stream registered.
    Subscribe {
        /// Stream class.
        kind: StreamKind,
        /// Portfolio.
        portfolio: PortfolioId,
        /// Exchange.
        exchange: Exchange,
    },
    /// Push stream dropped.
    Unsubscribe {
        /// Registration removed.
        id: SubscriptionId,
    },
    /// Order created.
    Create {
        /// Assigned number.
        number: OrderNumber,
        /// Kind and prices.
        kind: PaperOrderKind,
    },
    /// Cancel requested.
    Cancel {
        /// Order number.
        number: OrderNumber,
        /// Sent through the stop-order endpoint.
        stop: bool,
    },
}

type PositionKey = (PortfolioId, Exchange, Symbol);

#[derive(Default)]
struct PaperState {
    instruments: HashMap<(Exchange, Symbol), SymbolInfo>,
    portfolios: Vec<PortfolioAccount>,
    money: BTreeMap<(PortfolioId, Exchange), Money>,
    positions: BTreeMap<PositionKey, PositionSnapshot>,
    last_prices: HashMap<(Exchange, Symbol), Decimal>,
    subscriptions: Vec<Subscription>,
    orders: BTreeMap<OrderNumber, PaperOrder>,
    next_number: u64,
    calls: Vec<PaperCall>,
    order_failure: Option<ExchangeError>,
    confirm_cancels: bool,
}

/// In-memory exchange.
pub struct PaperExchange {
    push: PushSender,
    state: Mutex<PaperState>,
}

impl PaperExchange {
    /// Create an empty exchange reporting over `push`.
    ///
    /// Cancel requests are confirmed immediately by default.
    #[must_use]
    pub fn new(push: PushSender) -> Self {
        Self {
            push,
            state: Mutex::new(PaperState {
                next_number: 1,
                confirm_cancels: true,
                ..PaperState::default()
            }),
        }
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Publish an instrument.
    #[must_use]
    pub fn with_instrument(self, info: SymbolInfo) -> Self {
        self.state
            .lock()
            .instruments
            .insert((info.exchange.clone(), info.symbol.clone()), info);
        self
    }

    /// Add a portfolio with its trading account.
    #[must_use]
    pub fn with_portfolio(self, portfolio: PortfolioId, account: AccountId) -> Self {
        self.state
            .lock()
            .portfolios
            .push(PortfolioAccount { portfolio, account });
        self
    }

    /// Set the money snapshot for a (portfolio, exchange).
    #[must_use]
    pub fn with_money(self, portfolio: PortfolioId, exchange: Exchange, money: Money) -> Self {
        self.state.lock().money.insert((portfolio, exchange), money);
        self
    }

    /// Seed a position snapshot.
    #[must_use]
    pub fn with_position(self, snapshot: PositionSnapshot) -> Self {
        let key = (
            snapshot.portfolio.clone(),
            snapshot.exchange.clone(),
            snapshot.symbol.clone(),
        );
        self.state.lock().positions.insert(key, snapshot);
        self
    }

    // ========================================================================
    // Controls
    // ========================================================================

    /// Make every order creation fail with `error` until cleared with `None`.
    pub fn fail_orders(&self, error: Option<ExchangeError>) {
        self.state.lock().order_failure = error;
    }

    /// Confirm cancel requests immediately (`true`) or wait for
    /// [`PaperExchange::confirm_cancel`].
    pub fn set_confirm_cancels(&self, confirm: bool) {
        self.state.lock().confirm_cancels = confirm;
    }

    /// Send an arbitrary push event.
    pub fn emit(&self, event: PushEvent) {
        if self.push.send(event).is_err() {
            warn!("Push channel closed");
        }
    }

    /// Fill `lots` of a working order at `price` (exchange units).
    ///
    /// Emits the trade, the updated position, the cash balance, and a
    /// filled update once nothing remains.
    pub fn fill(
        &self,
        number: &OrderNumber,
        lots: Decimal,
        price: Decimal,
    ) -> Result<(), ExchangeError> {
        let events = {
            let mut state = self.state.lock();
            state.fill(number, lots, price)?
        };
        events.into_iter().for_each(|event| self.emit(event));
        Ok(())
    }

    /// Confirm a pending cancel.
    pub fn confirm_cancel(&self, number: &OrderNumber) -> Result<(), ExchangeError> {
        self.close(number, PaperOrderState::CancelPending, PaperOrderState::Canceled)
    }

    /// Expire a working order.
    pub fn expire(&self, number: &OrderNumber) -> Result<(), ExchangeError> {
        self.close(number, PaperOrderState::Working, PaperOrderState::Expired)
    }

    /// Reject a working order after acceptance (margin call).
    pub fn reject(&self, number: &OrderNumber) -> Result<(), ExchangeError> {
        self.close(number, PaperOrderState::Working, PaperOrderState::Rejected)
    }

    /// Publish a new last price and fill every working order it trades
    /// through. Returns the number of orders that traded.
    pub fn set_price(&self, exchange: &Exchange, symbol: &Symbol, last: Decimal) -> usize {
        let events = {
            let mut state = self.state.lock();
            state.set_price(exchange, symbol, last)
        };
        let traded = events
            .iter()
            .filter(|event| matches!(event, PushEvent::Trade(_)))
            .count();
        events.into_iter().for_each(|event| self.emit(event));
        traded
    }

    /// Set free cash and push the currency balance.
    pub fn set_cash(&self, portfolio: &PortfolioId, exchange: &Exchange, cash: Decimal) {
        let event = {
            let mut state = self.state.lock();
            let money = state
                .money
                .entry((portfolio.clone(), exchange.clone()))
                .or_default();
            money.portfolio += cash - money.cash;
            money.cash = cash;
            cash_snapshot(portfolio, exchange, cash)
        };
        self.emit(event);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Every request received, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<PaperCall> {
        self.state.lock().calls.clone()
    }

    /// Every order created, by number.
    #[must_use]
    pub fn orders(&self) -> Vec<PaperOrder> {
        self.state.lock().orders.values().cloned().collect()
    }

    /// One order by number.
    #[must_use]
    pub fn order(&self, number: &OrderNumber) -> Option<PaperOrder> {
        self.state.lock().orders.get(number).cloned()
    }

    /// Numbers of orders a cancel was requested for, oldest first.
    #[must_use]
    pub fn cancel_requests(&self) -> Vec<OrderNumber> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                PaperCall::Cancel { number, .. } => Some(number.clone()),
                _ => None,
            })
            .collect()
    }

    fn close(
        &self,
        number: &OrderNumber,
        from: PaperOrderState,
        to: PaperOrderState,
    ) -> Result<(), ExchangeError> {
        let event = {
            let mut state = self.state.lock();
            let order = state.order_mut(number)?;
            if order.state != from {
                return Err(ExchangeError::Rejected {
                    reason: format!("order {number} is {:?}", order.state),
                });
            }
            order.state = to;
            status_event(order)
        };
        self.emit(event);
        Ok(())
    }

    fn create(&self, order: &NewOrder, kind: PaperOrderKind) -> Result<OrderNumber, ExchangeError> {
        let mut state = self.state.lock();
        if let Some(error) = &state.order_failure {
            return Err(error.clone());
        }
        if !state
            .instruments
            .contains_key(&(order.exchange.clone(), order.symbol.clone()))
        {
            return Err(ExchangeError::NotFound {
                what: format!("{}:{}", order.exchange, order.symbol),
            });
        }
        if order.quantity <= Decimal::ZERO {
            return Err(ExchangeError::Rejected {
                reason: "quantity must be positive".to_string(),
            });
        }
        let number = OrderNumber::new(state.next_number.to_string());
        state.next_number += 1;
        debug!(order_number = %number, symbol = %order.symbol, side = %order.side, lots = %order.quantity, "Paper order created");
        state.calls.push(PaperCall::Create {
            number: number.clone(),
            kind: kind.clone(),
        });
        state.orders.insert(
            number.clone(),
            PaperOrder {
                number: number.clone(),
                request: order.clone(),
                kind,
                state: PaperOrderState::Working,
                filled_lots: Decimal::ZERO,
            },
        );
        Ok(number)
    }

    fn request_cancel(&self, number: &OrderNumber, stop: bool) -> Result<(), ExchangeError> {
        let (confirm, event) = {
            let mut state = self.state.lock();
            state.calls.push(PaperCall::Cancel {
                number: number.clone(),
                stop,
            });
            let confirm = state.confirm_cancels;
            let order = state.order_mut(number)?;
            if order.kind.is_stop() != stop {
                return Err(ExchangeError::NotFound {
                    what: format!("order {number} on this endpoint"),
                });
            }
            if !order.is_working() {
                return Err(ExchangeError::Rejected {
                    reason: format!("order {number} is {:?}", order.state),
                });
            }
            order.state = if confirm {
                PaperOrderState::Canceled
            } else {
                PaperOrderState::CancelPending
            };
            (confirm, status_event(order))
        };
        if confirm {
            self.emit(event);
        }
        Ok(())
    }
}

impl PaperState {
    fn order_mut(&mut self, number: &OrderNumber) -> Result<&mut PaperOrder, ExchangeError> {
        self.orders.get_mut(number).ok_or_else(|| ExchangeError::NotFound {
            what: format!("order {number}"),
        })
    }

    fn fill(
        &mut self,
        number: &OrderNumber,
        lots: Decimal,
        price: Decimal,
    ) -> Result<Vec<PushEvent>, ExchangeError> {
        let order = self.order_mut(number)?;
        if !order.is_working() {
            return Err(ExchangeError::Rejected {
                reason: format!("order {number} is {:?}", order.state),
            });
        }
        let lots = lots.min(order.remaining_lots());
        if lots <= Decimal::ZERO {
            return Err(ExchangeError::Rejected {
                reason: "nothing left to fill".to_string(),
            });
        }
        order.filled_lots += lots;
        if order.remaining_lots().is_zero() {
            order.state = PaperOrderState::Filled;
        }
        let order = order.clone();

        let key = (order.request.exchange.clone(), order.request.symbol.clone());
        let lot_size = self
            .instruments
            .get(&key)
            .map_or(Decimal::ONE, |info| info.lot_size);
        let units = lots * lot_size;
        let signed = order.request.side.signed(units);

        let mut events = vec![PushEvent::Trade(TradeUpdate {
            order_number: order.number.clone(),
            exchange: order.request.exchange.clone(),
            symbol: order.request.symbol.clone(),
            side: order.request.side,
            quantity_units: units,
            price,
            timestamp: Utc::now(),
        })];

        let position_key = (
            order.request.portfolio.clone(),
            order.request.exchange.clone(),
            order.request.symbol.clone(),
        );
        let snapshot = self
            .positions
            .entry(position_key)
            .or_insert_with(|| PositionSnapshot {
                portfolio: order.request.portfolio.clone(),
                exchange: order.request.exchange.clone(),
                symbol: order.request.symbol.clone(),
                is_currency: false,
                qty_lots: Decimal::ZERO,
                volume: Decimal::ZERO,
                unrealised_pl: Decimal::ZERO,
            });
        let held = snapshot.qty_lots * lot_size;
        let average = if held.is_zero() {
            Decimal::ZERO
        } else {
            (snapshot.volume / held).abs()
        };
        let mut position = Position::new(held, average);
        position.update(signed, price);
        snapshot.qty_lots = position.size / lot_size;
        snapshot.volume = position.size * position.price;
        snapshot.unrealised_pl = Decimal::ZERO;
        events.push(PushEvent::Position(snapshot.clone()));

        let money = self
            .money
            .entry((order.request.portfolio.clone(), order.request.exchange.clone()))
            .or_default();
        money.cash -= signed * price;
        events.push(cash_snapshot(
            &order.request.portfolio,
            &order.request.exchange,
            money.cash,
        ));

        self.last_prices.insert(key, price);
        if order.state == PaperOrderState::Filled {
            events.push(status_event(&order));
        }
        Ok(events)
    }

    fn set_price(&mut self, exchange: &Exchange, symbol: &Symbol, last: Decimal) -> Vec<PushEvent> {
        let key = (exchange.clone(), symbol.clone());
        let previous = self.last_prices.insert(key, last);
        let lot_size = self
            .instruments
            .get(&(exchange.clone(), symbol.clone()))
            .map_or(Decimal::ONE, |info| info.lot_size);

        let mut events = Vec::new();
        for snapshot in self
            .positions
            .values_mut()
            .filter(|snapshot| &snapshot.exchange == exchange && &snapshot.symbol == symbol)
        {
            let units = snapshot.qty_lots * lot_size;
            if let Some(previous) = previous
                && let Some(money) = self
                    .money
                    .get_mut(&(snapshot.portfolio.clone(), snapshot.exchange.clone()))
            {
                money.portfolio += units * (last - previous);
            }
            snapshot.unrealised_pl = units * last - snapshot.volume;
            events.push(PushEvent::Position(snapshot.clone()));
        }

        let crossing: Vec<(OrderNumber, Decimal, Decimal)> = self
            .orders
            .values()
            .filter(|order| {
                order.is_working()
                    && &order.request.exchange == exchange
                    && &order.request.symbol == symbol
            })
            .filter_map(|order| {
                order
                    .execution_price(last)
                    .map(|price| (order.number.clone(), order.remaining_lots(), price))
            })
            .collect();
        for (number, lots, price) in crossing {
            match self.fill(&number, lots, price) {
                Ok(fill_events) => events.extend(fill_events),
                Err(error) => warn!(order_number = %number, %error, "Paper fill failed"),
            }
        }
        events
    }
}

fn cash_snapshot(portfolio: &PortfolioId, exchange: &Exchange, cash: Decimal) -> PushEvent {
    PushEvent::Position(PositionSnapshot {
        portfolio: portfolio.clone(),
        exchange: exchange.clone(),
        symbol: Symbol::new(CASH_SYMBOL),
        is_currency: true,
        qty_lots: cash,
        volume: cash,
        unrealised_pl: Decimal::ZERO,
    })
}

fn status_event(order: &PaperOrder) -> PushEvent {
    let status = match order.state {
        PaperOrderState::Working | PaperOrderState::CancelPending => ExchangeOrderStatus::Working,
        PaperOrderState::Filled => ExchangeOrderStatus::Filled,
        PaperOrderState::Canceled => ExchangeOrderStatus::Canceled,
        PaperOrderState::Expired => ExchangeOrderStatus::Expired,
        PaperOrderState::Rejected => ExchangeOrderStatus::Rejected,
    };
    let update = OrderUpdate {
        order_number: order.number.clone(),
        exchange: order.request.exchange.clone(),
        status,
    };
    if order.kind.is_stop() {
        PushEvent::StopOrder(update)
    } else {
        PushEvent::Order(update)
    }
}

#[async_trait]
impl ExchangePort for PaperExchange {
    async fn symbol_info(
        &self,
        exchange: &Exchange,
        symbol: &Symbol,
    ) -> Result<Option<SymbolInfo>, ExchangeError> {
        Ok(self
            .state
            .lock()
            .instruments
            .get(&(exchange.clone(), symbol.clone()))
            .cloned())
    }

    async fn portfolios(&self) -> Result<Vec<PortfolioAccount>, ExchangeError> {
        Ok(self.state.lock().portfolios.clone())
    }

    async fn money(
        &self,
        portfolio: &PortfolioId,
        exchange: &Exchange,
    ) -> Result<Money, ExchangeError> {
        Ok(self
            .state
            .lock()
            .money
            .get(&(portfolio.clone(), exchange.clone()))
            .copied()
            .unwrap_or_default())
    }

    async fn positions(
        &self,
        portfolio: &PortfolioId,
        exchange: &Exchange,
    ) -> Result<Vec<PositionSnapshot>, ExchangeError> {
        let state = self.state.lock();
        let mut snapshots: Vec<PositionSnapshot> = state
            .positions
            .values()
            .filter(|snapshot| &snapshot.portfolio == portfolio && &snapshot.exchange == exchange)
            .cloned()
            .collect();
        if let Some(money) = state.money.get(&(portfolio.clone(), exchange.clone()))
            && let PushEvent::Position(cash) = cash_snapshot(portfolio, exchange, money.cash)
        {
            snapshots.push(cash);
        }
        Ok(snapshots)
    }

    async fn position(
        &self,
        portfolio: &PortfolioId,
        exchange: &Exchange,
        symbol: &Symbol,
    ) -> Result<Option<PositionSnapshot>, ExchangeError> {
        Ok(self
            .state
            .lock()
            .positions
            .get(&(portfolio.clone(), exchange.clone(), symbol.clone()))
            .filter(|snapshot| !snapshot.qty_lots.is_zero())
            .cloned())
    }

    async fn subscribe(
        &self,
        kind: StreamKind,
        portfolio: &PortfolioId,
        exchange: &Exchange,
    ) -> Result<SubscriptionId, ExchangeError> {
        let id = SubscriptionId::generate();
        let mut state = self.state.lock();
        state.calls.push(PaperCall::Subscribe {
            kind,
            portfolio: portfolio.clone(),
            exchange: exchange.clone(),
        });
        state.subscriptions.push(Subscription {
            id: id.clone(),
            kind,
            portfolio: portfolio.clone(),
            exchange: exchange.clone(),
        });
        Ok(id)
    }

    async fn unsubscribe(&self, id: &SubscriptionId) -> Result<(), ExchangeError> {
        let mut state = self.state.lock();
        state
            .calls
            .push(PaperCall::Unsubscribe { id: id.clone() });
        let before = state.subscriptions.len();
        state.subscriptions.retain(|subscription| &subscription.id != id);
        if state.subscriptions.len() == before {
            return Err(ExchangeError::NotFound {
                what: format!("subscription {id}"),
            });
        }
        Ok(())
    }

    fn subscriptions(&self) -> Vec<Subscription> {
        self.state.lock().subscriptions.clone()
    }

    async fn create_market_order(&self, order: &NewOrder) -> Result<OrderNumber, ExchangeError> {
        self.create(order, PaperOrderKind::Market)
    }

    async fn create_limit_order(
        &self,
        order: &NewOrder,
        price: Decimal,
    ) -> Result<OrderNumber, ExchangeError> {
        self.create(order, PaperOrderKind::Limit { price })
    }

    async fn create_stop_order(
        &self,
        order: &NewOrder,
        trigger: Decimal,
        server: &ServerCode,
    ) -> Result<OrderNumber, ExchangeError> {
        self.create(
            order,
            PaperOrderKind::Stop {
                trigger,
                server: server.clone(),
            },
        )
    }

    async fn create_stop_limit_order(
        &self,
        order: &NewOrder,
        trigger: Decimal,
        limit: Decimal,
        server: &ServerCode,
    ) -> Result<OrderNumber, ExchangeError> {
        self.create(
            order,
            PaperOrderKind::StopLimit {
                trigger,
                limit,
                server: server.clone(),
            },
        )
    }

    async fn cancel_order(
        &self,
        _portfolio: &PortfolioId,
        _exchange: &Exchange,
        number: &OrderNumber,
    ) -> Result<(), ExchangeError> {
        self.request_cancel(number, false)
    }

    async fn cancel_stop_order(
        &self,
        _server: &ServerCode,
        _portfolio: &PortfolioId,
        number: &OrderNumber,
    ) -> Result<(), ExchangeError> {
        self.request_cancel(number, true)
    }
}
