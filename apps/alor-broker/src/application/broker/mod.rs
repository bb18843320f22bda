//! Broker
//!
//! The strategy-facing broker: creates and validates orders, routes them to
//! the exchange, applies push events, and reconciles linked orders.
//!
//! # Concurrency
//!
//! The broker owns all of its state and is driven through `&mut self`.
//! Push events reach it through a [`PushReceiver`] and are applied in
//! [`Broker::next`] (or [`Broker::pump_events`]), never from the network
//! task, so the order table, ledgers, and linked-order registries need no
//! locks.

mod cancel;
mod ledger;
mod push;
mod reconcile;
mod router;
mod settings;

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::application::ports::{BarUpdate, ExchangePort, PushReceiver};
use crate::application::services::{
    CashLedger, InstrumentCatalog, Notification, NotificationQueue, PositionBook,
    SubscriptionManager,
};
use crate::domain::instrument::PriceTranslator;
use crate::domain::linking::{BracketError, BracketRequest, LinkedOrders};
use crate::domain::order::{Order, OrderRequest, OrderSide};
use crate::domain::position::Position;
use crate::domain::shared::{AccountId, InstrumentId, OrderNumber, OrderRef, PortfolioId};
use crate::observability::metrics;

pub use cancel::CancelOutcome;
pub use settings::{BoardBinding, BrokerSettings};

/// Broker for one exchange client.
pub struct Broker<E: ExchangePort> {
    exchange: Arc<E>,
    settings: BrokerSettings,
    catalog: InstrumentCatalog<E>,
    subscriptions: SubscriptionManager<E>,
    push: PushReceiver,
    bars: Option<mpsc::UnboundedSender<BarUpdate>>,
    orders: BTreeMap<OrderRef, Order>,
    last_ref: OrderRef,
    linked: LinkedOrders,
    ledger: CashLedger,
    positions: PositionBook,
    notifications: NotificationQueue,
    accounts: BTreeMap<PortfolioId, AccountId>,
    starting_cash: Decimal,
    starting_value: Decimal,
}

impl<E: ExchangePort> Broker<E> {
    /// Create a broker.
    pub fn new(exchange: Arc<E>, settings: BrokerSettings, push: PushReceiver) -> Self {
        let translator = PriceTranslator::new(settings.bond_boards.iter().cloned());
        Self {
            catalog: InstrumentCatalog::new(Arc::clone(&exchange), translator),
            subscriptions: SubscriptionManager::new(Arc::clone(&exchange)),
            exchange,
            settings,
            push,
            bars: None,
            orders: BTreeMap::new(),
            last_ref: OrderRef::new(0),
            linked: LinkedOrders::new(),
            ledger: CashLedger::new(),
            positions: PositionBook::new(),
            notifications: NotificationQueue::new(),
            accounts: BTreeMap::new(),
            starting_cash: Decimal::ZERO,
            starting_value: Decimal::ZERO,
        }
    }

    /// Forward new-bar push events to `sink`.
    #[must_use]
    pub fn with_bar_sink(mut self, sink: mpsc::UnboundedSender<BarUpdate>) -> Self {
        self.bars = Some(sink);
        self
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Load accounts, seed positions, and capture starting cash/value.
    pub async fn start(&mut self) {
        self.refresh_accounts().await;
        if self.settings.use_positions {
            self.seed_positions().await;
        }
        self.starting_cash = self.getcash(None).await;
        self.starting_value = self.getvalue(None).await;
        info!(
            cash = %self.starting_cash,
            value = %self.starting_value,
            accounts = self.accounts.len(),
            positions = self.positions.open().count(),
            "Broker started"
        );
    }

    /// Drop every managed push subscription.
    pub async fn stop(&mut self) {
        let removed = self.subscriptions.unsubscribe_all().await;
        info!(removed, live_orders = self.live_orders(), "Broker stopped");
    }

    /// Apply pending push events and close the current tick.
    pub async fn next(&mut self) {
        self.pump_events().await;
        self.notifications.push_boundary();
        metrics::update_live_orders(self.live_orders());
    }

    // ========================================================================
    // Strategy API
    // ========================================================================

    /// Buy according to `request`.
    pub async fn buy(&mut self, request: OrderRequest) -> OrderRef {
        self.create_order(OrderSide::Buy, request).await
    }

    /// Sell according to `request`.
    pub async fn sell(&mut self, request: OrderRequest) -> OrderRef {
        self.create_order(OrderSide::Sell, request).await
    }

    /// Cancel an order.
    ///
    /// A working order is only asked to cancel; its status changes when
    /// the exchange confirms. A held order is canceled on the spot.
    pub async fn cancel(&mut self, reference: OrderRef) -> CancelOutcome {
        let outcome = self.cancel_order(reference).await;
        if outcome == CancelOutcome::CanceledLocally {
            self.settle(reference).await;
        }
        outcome
    }

    /// Buy bracket: entry, stop-loss below, take-profit above.
    ///
    /// Returns `[entry, stop_loss, take_profit]`.
    ///
    /// # Errors
    ///
    /// Returns error if the bracket is incoherent; nothing is created then.
    pub async fn buy_bracket(
        &mut self,
        bracket: BracketRequest,
    ) -> Result<[OrderRef; 3], BracketError> {
        self.bracket(OrderSide::Buy, bracket).await
    }

    /// Sell bracket: entry, stop-loss above, take-profit below.
    ///
    /// # Errors
    ///
    /// Returns error if the bracket is incoherent; nothing is created then.
    pub async fn sell_bracket(
        &mut self,
        bracket: BracketRequest,
    ) -> Result<[OrderRef; 3], BracketError> {
        self.bracket(OrderSide::Sell, bracket).await
    }

    async fn bracket(
        &mut self,
        side: OrderSide,
        bracket: BracketRequest,
    ) -> Result<[OrderRef; 3], BracketError> {
        bracket.validate(side)?;
        let exit = side.opposite();
        let entry = self.create_order(side, bracket.entry_request()).await;
        let stop_loss = self
            .create_order(exit, bracket.stop_loss_request(entry))
            .await;
        let take_profit = self
            .create_order(exit, bracket.take_profit_request(entry))
            .await;
        Ok([entry, stop_loss, take_profit])
    }

    /// Order by local reference.
    #[must_use]
    pub fn order(&self, reference: OrderRef) -> Option<&Order> {
        self.orders.get(&reference)
    }

    /// Every tracked order, oldest first.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Local reference of the order the exchange numbered `number`.
    #[must_use]
    pub fn order_by_number(&self, number: &OrderNumber) -> Option<OrderRef> {
        self.orders
            .values()
            .find(|order| order.order_number() == Some(number))
            .map(Order::reference)
    }

    /// Number of orders that are not terminal.
    #[must_use]
    pub fn live_orders(&self) -> usize {
        self.orders.values().filter(|order| order.is_alive()).count()
    }

    /// Position for `instrument`, flat if unknown.
    #[must_use]
    pub fn getposition(&self, instrument: &InstrumentId) -> Position {
        self.positions.get(instrument)
    }

    /// Linked-order registries.
    #[must_use]
    pub const fn linked(&self) -> &LinkedOrders {
        &self.linked
    }

    /// Drop terminal orders no registry refers to.
    ///
    /// Returns the number of orders dropped.
    pub fn purge_terminal(&mut self) -> usize {
        let before = self.orders.len();
        let linked = &self.linked;
        self.orders
            .retain(|reference, order| order.is_alive() || linked.references(*reference));
        before - self.orders.len()
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Oldest queued notification, `None` when the queue is empty.
    pub fn get_notification(&mut self) -> Option<Notification> {
        self.notifications.pop()
    }

    /// Order snapshots up to the next tick boundary.
    pub fn drain_notifications(&mut self) -> Vec<Order> {
        self.notifications.drain_tick()
    }

    fn notify(&mut self, reference: OrderRef) {
        if let Some(order) = self.orders.get(&reference) {
            self.notifications.push_order(order);
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    const fn allocate_ref(&mut self) -> OrderRef {
        self.last_ref = self.last_ref.next();
        self.last_ref
    }

    async fn refresh_accounts(&mut self) {
        match self.exchange.portfolios().await {
            Ok(portfolios) => {
                let configured = &self.settings.accounts;
                self.accounts = portfolios
                    .into_iter()
                    .filter(|entry| configured.is_empty() || configured.contains_key(&entry.portfolio))
                    .map(|entry| (entry.portfolio, entry.account))
                    .collect();
            }
            Err(error) => warn!(%error, "Portfolio enumeration failed"),
        }
    }

    async fn account_for(&mut self, portfolio: &PortfolioId) -> Option<AccountId> {
        if !self.accounts.contains_key(portfolio) {
            self.refresh_accounts().await;
        }
        self.accounts.get(portfolio).cloned()
    }
}
