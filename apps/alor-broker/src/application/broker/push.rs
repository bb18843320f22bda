//! Push event handling.

use rust_decimal::Decimal;
use tracing::{debug, info, trace, warn};

use super::Broker;
use crate::application::ports::{
    ConnectionEvent, ExchangeOrderStatus, ExchangePort, OrderUpdate, PositionSnapshot, PushEvent,
    TradeUpdate,
};
use crate::domain::order::{Fill, Order, OrderError, OrderStatus};
use crate::domain::position::{CashValue, Position};
use crate::domain::shared::InstrumentId;
use crate::observability::metrics;

impl<E: ExchangePort> Broker<E> {
    /// Apply every push event already waiting on the channel.
    ///
    /// Returns the number of events applied.
    pub async fn pump_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.push.try_recv() {
            self.on_push(event).await;
            applied += 1;
        }
        applied
    }

    /// Apply one push event.
    pub async fn on_push(&mut self, event: PushEvent) {
        metrics::record_push_event(event.kind());
        match event {
            PushEvent::NewBar(update) => {
                if let Some(sink) = &self.bars {
                    if sink.send(update).is_err() {
                        warn!("Bar sink closed, dropping bar forwarding");
                        self.bars = None;
                    }
                } else {
                    trace!(subscription = %update.subscription, "Bar without sink");
                }
            }
            PushEvent::Position(snapshot) => self.on_position(snapshot).await,
            PushEvent::Trade(trade) => self.on_trade(trade).await,
            PushEvent::Order(update) | PushEvent::StopOrder(update) => {
                self.on_order_update(update).await;
            }
            PushEvent::Connection(event) => log_connection(&event),
        }
    }

    async fn on_position(&mut self, snapshot: PositionSnapshot) {
        if snapshot.is_currency {
            match self
                .exchange
                .money(&snapshot.portfolio, &snapshot.exchange)
                .await
            {
                Ok(money) => {
                    let entry = CashValue::from_equity(money.portfolio, snapshot.volume);
                    debug!(
                        portfolio = %snapshot.portfolio,
                        exchange = %snapshot.exchange,
                        cash = %entry.cash,
                        value = %entry.value,
                        "Cash updated"
                    );
                    self.ledger
                        .record(snapshot.portfolio, snapshot.exchange, entry);
                }
                Err(error) => warn!(
                    portfolio = %snapshot.portfolio,
                    exchange = %snapshot.exchange,
                    %error,
                    "Money snapshot failed"
                ),
            }
            return;
        }

        let instrument = InstrumentId::new(snapshot.exchange.clone(), snapshot.symbol.clone());
        let Some(info) = self.catalog.lookup(&instrument).await else {
            trace!(instrument = %instrument, "Position for unknown instrument");
            return;
        };
        let position = position_from_snapshot(&snapshot, info.lot_size);
        debug!(instrument = %instrument, size = %position.size, price = %position.price, "Position updated");
        self.positions.overwrite(instrument, position);
    }

    async fn on_trade(&mut self, trade: TradeUpdate) {
        let Some(reference) = self.order_by_number(&trade.order_number) else {
            trace!(order_number = %trade.order_number, "Trade for foreign order");
            return;
        };
        let Some(order) = self.orders.get(&reference) else {
            return;
        };
        let instrument = order.instrument().clone();

        let price = match self.catalog.lookup(&instrument).await {
            Some(info) => self.catalog.to_local_price(&info, trade.price),
            None => trade.price,
        };
        let size = trade.side.signed(trade.quantity_units);
        let mut position = self.positions.get(&instrument);
        let change = position.update(size, price);
        let fill = Fill {
            size,
            price,
            at: trade.timestamp,
            opened: change.opened,
            closed: change.closed,
            pnl: change.pnl,
        };

        let Some(order) = self.orders.get_mut(&reference) else {
            return;
        };
        let status = match order.execute(fill) {
            Ok(status) => status,
            Err(error) => {
                warn!(order_ref = %reference, order_number = %trade.order_number, %error, "Trade not applied");
                return;
            }
        };
        metrics::record_fill(trade.side.as_str());
        self.positions.overwrite(instrument, position);
        info!(
            order_ref = %reference,
            order_number = %trade.order_number,
            size = %size,
            price = %price,
            remaining = %order.execution().remaining,
            status = %status,
            "Order filled"
        );
        self.notify(reference);
        if status == OrderStatus::Completed {
            self.settle(reference).await;
        }
    }

    async fn on_order_update(&mut self, update: OrderUpdate) {
        let apply: fn(&mut Order) -> Result<(), OrderError> = match update.status {
            ExchangeOrderStatus::Canceled => Order::cancel,
            ExchangeOrderStatus::Expired => Order::expire,
            ExchangeOrderStatus::Rejected => Order::margin,
            ExchangeOrderStatus::Working | ExchangeOrderStatus::Filled => {
                trace!(order_number = %update.order_number, status = ?update.status, "Order update ignored");
                return;
            }
        };
        let Some(reference) = self.order_by_number(&update.order_number) else {
            trace!(order_number = %update.order_number, "Update for foreign order");
            return;
        };
        let Some(order) = self.orders.get_mut(&reference) else {
            return;
        };
        if let Err(error) = apply(order) {
            debug!(order_ref = %reference, %error, "Order update not applied");
            return;
        }
        match order.status() {
            OrderStatus::Canceled => metrics::record_order_cancel(),
            OrderStatus::Margin => metrics::record_order_rejection("MARGIN"),
            _ => {}
        }
        info!(
            order_ref = %reference,
            order_number = %update.order_number,
            status = %order.status(),
            "Order closed by exchange"
        );
        self.notify(reference);
        self.settle(reference).await;
    }
}

/// Position from a snapshot: size in units, price per unit.
pub(super) fn position_from_snapshot(snapshot: &PositionSnapshot, lot_size: Decimal) -> Position {
    let size = snapshot.qty_lots * lot_size;
    let price = if size.is_zero() {
        Decimal::ZERO
    } else {
        (snapshot.volume / size).abs().round_dp(2)
    };
    Position::new(size, price)
}

fn log_connection(event: &ConnectionEvent) {
    match event {
        ConnectionEvent::Entering => debug!("Push channel starting"),
        ConnectionEvent::Connected => debug!("Push channel connected"),
        ConnectionEvent::Resubscribe { count } => {
            debug!(count, "Push channel restoring subscriptions");
        }
        ConnectionEvent::Ready => debug!("Push channel ready"),
        ConnectionEvent::Disconnected => debug!("Push channel disconnected"),
        ConnectionEvent::Timeout => debug!("Push channel timed out"),
        ConnectionEvent::Error { message } => warn!(%message, "Push channel error"),
        ConnectionEvent::Exit => debug!("Push channel closed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::{Exchange, PortfolioId, Symbol};
    use rust_decimal_macros::dec;

    fn snapshot(qty_lots: Decimal, volume: Decimal) -> PositionSnapshot {
        PositionSnapshot {
            portfolio: PortfolioId::new("D12345"),
            exchange: Exchange::new("MOEX"),
            symbol: Symbol::new("SBER"),
            is_currency: false,
            qty_lots,
            volume,
            unrealised_pl: Decimal::ZERO,
        }
    }

    #[test]
    fn snapshot_size_is_lots_times_lot_size() {
        let position = position_from_snapshot(&snapshot(dec!(2), dec!(5000)), dec!(10));
        assert_eq!(position, Position::new(dec!(20), dec!(250)));
    }

    #[test]
    fn short_snapshot_keeps_positive_price() {
        let position = position_from_snapshot(&snapshot(dec!(-3), dec!(-7500)), dec!(10));
        assert_eq!(position, Position::new(dec!(-30), dec!(250)));
    }

    #[test]
    fn flat_snapshot_has_zero_price() {
        let position = position_from_snapshot(&snapshot(dec!(0), dec!(0)), dec!(10));
        assert!(position.is_flat());
        assert_eq!(position.price, Decimal::ZERO);
    }
}
