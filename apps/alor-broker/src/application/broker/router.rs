//! Order creation, validation and routing.

use std::time::Instant;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::Broker;
use crate::application::ports::{ExchangePort, NewOrder};
use crate::domain::order::{
    ExecType, Order, OrderKind, OrderRequest, OrderSide, OrderStatus, RejectReason, Routing,
};
use crate::domain::shared::OrderRef;
use crate::observability::metrics;

/// What routing did to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Routed {
    /// Accepted by the exchange.
    Accepted,
    /// Rejected; linked orders must be reconciled.
    Rejected,
    /// Not routable in its current status.
    Skipped,
}

impl<E: ExchangePort> Broker<E> {
    /// Create, validate and (when transmitting) route an order.
    ///
    /// Always returns the new order's reference: rejections show up as the
    /// order's status and a notification, never as an error.
    pub(super) async fn create_order(&mut self, side: OrderSide, request: OrderRequest) -> OrderRef {
        let reference = self.allocate_ref();
        let mut order = Order::new(reference, side, request);

        let routing = match self.validate(&order).await {
            Ok(routing) => routing,
            Err(reason) => {
                warn!(
                    order_ref = %reference,
                    instrument = %order.instrument(),
                    reason = %reason,
                    "Order rejected by validation"
                );
                metrics::record_order_rejection(&reason.code);
                if let Err(error) = order.reject(reason) {
                    debug!(order_ref = %reference, %error, "Reject on new order");
                }
                self.orders.insert(reference, order);
                self.notify(reference);
                self.settle(reference).await;
                return reference;
            }
        };
        order.bind(routing);

        if let Some(partner) = order.oco() {
            self.linked.register_oco(reference, partner);
        }
        let chain_member = order.is_chain_member();
        if chain_member {
            self.linked.enqueue(order.chain_key(), reference);
        }
        let transmit = order.transmit();
        let head = order.chain_key();
        self.orders.insert(reference, order);

        if chain_member {
            debug!(order_ref = %reference, chain = %head, transmit, "Order held in chain");
            self.notify(reference);
        }
        if transmit && self.route(head).await == Routed::Rejected {
            self.settle(head).await;
        }
        reference
    }

    /// Ordered validation; the first failing check decides the reason.
    async fn validate(&self, order: &Order) -> Result<Routing, RejectReason> {
        let exec_type = order.exec_type();
        if !exec_type.is_routable() {
            return Err(RejectReason::unsupported_order_type(exec_type));
        }

        let instrument = order.instrument();
        let info = self
            .catalog
            .lookup(instrument)
            .await
            .ok_or_else(|| RejectReason::instrument_not_found(instrument))?;
        let board = info.primary_board.clone();

        let portfolio = order
            .portfolio_override()
            .or_else(|| self.settings.portfolio_for(&board))
            .cloned()
            .ok_or_else(|| RejectReason::portfolio_not_found(&board))?;
        if !self.subscriptions.is_subscribed(&portfolio, &instrument.exchange)
            && let Err(error) = self
                .subscriptions
                .subscribe(&portfolio, &instrument.exchange)
                .await
        {
            warn!(%portfolio, exchange = %instrument.exchange, %error, "Subscription failed");
        }

        // A non-positive price counts as missing.
        let price = order.price().filter(|price| *price > Decimal::ZERO);
        if exec_type.requires_price() && price.is_none() {
            return Err(if exec_type == ExecType::Limit {
                RejectReason::limit_price_missing()
            } else {
                RejectReason::trigger_price_missing()
            });
        }

        let price_limit = order.price_limit().filter(|limit| *limit > Decimal::ZERO);
        if exec_type.requires_price_limit() && price_limit.is_none() {
            return Err(RejectReason::price_limit_missing());
        }

        let server = if exec_type.is_stop() {
            Some(
                order
                    .server_override()
                    .or_else(|| self.settings.server_for(&board))
                    .cloned()
                    .ok_or_else(|| RejectReason::server_not_found(&board))?,
            )
        } else {
            None
        };

        if let Some(parent) = order.parent()
            && !self.linked.has_chain(parent)
        {
            return Err(RejectReason::parent_not_found(parent));
        }

        if info.lots(order.size()).is_zero() {
            return Err(RejectReason::size_below_lot(info.lot_size));
        }

        let kind = match (exec_type, price, price_limit, server) {
            (ExecType::Market, _, _, _) => OrderKind::Market,
            (ExecType::Limit, Some(price), _, _) => OrderKind::Limit { price },
            (ExecType::Stop, Some(trigger), _, Some(server)) => OrderKind::Stop { trigger, server },
            (ExecType::StopLimit, Some(trigger), Some(limit), Some(server)) => OrderKind::StopLimit {
                trigger,
                limit,
                server,
            },
            _ => return Err(RejectReason::unsupported_order_type(exec_type)),
        };

        Ok(Routing {
            portfolio,
            board,
            kind,
        })
    }

    /// Send a validated `Created` order to the exchange.
    pub(super) async fn route(&mut self, reference: OrderRef) -> Routed {
        let Some(order) = self.orders.get(&reference) else {
            return Routed::Skipped;
        };
        let Some(routing) = order.routing().cloned() else {
            return Routed::Skipped;
        };
        if order.status() != OrderStatus::Created {
            debug!(order_ref = %reference, status = %order.status(), "Order not routable");
            return Routed::Skipped;
        }
        let instrument = order.instrument().clone();
        let side = order.side();
        let size = order.size();
        let time_in_force = order.time_in_force();

        let Some(info) = self.catalog.lookup(&instrument).await else {
            return self.reject(reference, RejectReason::instrument_not_found(&instrument));
        };
        let Some(account) = self.account_for(&routing.portfolio).await else {
            return self.reject(reference, RejectReason::account_not_found(&routing.portfolio));
        };

        let lots = info.lots(size);
        let request = NewOrder {
            account,
            portfolio: routing.portfolio.clone(),
            exchange: instrument.exchange.clone(),
            symbol: instrument.symbol.clone(),
            board: routing.board.clone(),
            side,
            quantity: lots,
            time_in_force,
        };

        let started = Instant::now();
        let result = match &routing.kind {
            OrderKind::Market => self.exchange.create_market_order(&request).await,
            OrderKind::Limit { price } => {
                let price = self.catalog.to_exchange_price(&info, *price);
                self.exchange.create_limit_order(&request, price).await
            }
            OrderKind::Stop { trigger, server } => {
                let trigger = self.catalog.to_exchange_price(&info, *trigger);
                self.exchange.create_stop_order(&request, trigger, server).await
            }
            OrderKind::StopLimit {
                trigger,
                limit,
                server,
            } => {
                let trigger = self.catalog.to_exchange_price(&info, *trigger);
                let limit = self.catalog.to_exchange_price(&info, *limit);
                self.exchange
                    .create_stop_limit_order(&request, trigger, limit, server)
                    .await
            }
        };
        metrics::record_order_submission(routing.kind.label(), started.elapsed().as_secs_f64());

        let Some(order) = self.orders.get_mut(&reference) else {
            return Routed::Skipped;
        };
        if let Err(error) = order.submit(info.units(lots)) {
            warn!(order_ref = %reference, %error, "Submit transition failed");
            return Routed::Skipped;
        }
        self.notify(reference);

        match result {
            Ok(number) => {
                let Some(order) = self.orders.get_mut(&reference) else {
                    return Routed::Skipped;
                };
                if let Err(error) = order.accept(number.clone()) {
                    warn!(order_ref = %reference, %error, "Accept transition failed");
                    return Routed::Skipped;
                }
                info!(
                    order_ref = %reference,
                    order_number = %number,
                    portfolio = %routing.portfolio,
                    instrument = %instrument,
                    side = %side,
                    lots = %lots,
                    kind = %routing.kind,
                    "Order accepted"
                );
                self.notify(reference);
                Routed::Accepted
            }
            Err(error) => self.reject(reference, RejectReason::exchange_error(error.to_string())),
        }
    }

    fn reject(&mut self, reference: OrderRef, reason: RejectReason) -> Routed {
        let Some(order) = self.orders.get_mut(&reference) else {
            return Routed::Skipped;
        };
        warn!(order_ref = %reference, reason = %reason, "Order rejected");
        metrics::record_order_rejection(&reason.code);
        if let Err(error) = order.reject(reason) {
            warn!(order_ref = %reference, %error, "Reject transition failed");
            return Routed::Skipped;
        }
        self.notify(reference);
        Routed::Rejected
    }
}
