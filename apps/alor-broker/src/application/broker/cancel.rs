//! Order cancellation.

use tracing::{debug, info, warn};

use super::Broker;
use crate::application::ports::ExchangePort;
use crate::domain::order::OrderStatus;
use crate::domain::shared::OrderRef;
use crate::observability::metrics;

/// Result of a cancel request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Cancel sent to the exchange; the status changes on confirmation.
    Requested,
    /// The order was held locally and is now canceled.
    CanceledLocally,
    /// Unknown or already terminal; nothing done.
    NotAlive,
}

impl<E: ExchangePort> Broker<E> {
    pub(super) async fn cancel_order(&mut self, reference: OrderRef) -> CancelOutcome {
        let Some(order) = self.orders.get_mut(&reference) else {
            return CancelOutcome::NotAlive;
        };
        if !order.is_alive() {
            return CancelOutcome::NotAlive;
        }

        if order.status() == OrderStatus::Created {
            if let Err(error) = order.cancel() {
                warn!(order_ref = %reference, %error, "Local cancel failed");
                return CancelOutcome::NotAlive;
            }
            info!(order_ref = %reference, "Held order canceled");
            metrics::record_order_cancel();
            self.notify(reference);
            return CancelOutcome::CanceledLocally;
        }

        let (Some(routing), Some(number)) = (order.routing().cloned(), order.order_number().cloned())
        else {
            debug!(order_ref = %reference, status = %order.status(), "No exchange order to cancel");
            return CancelOutcome::NotAlive;
        };
        let exchange = order.instrument().exchange.clone();

        let result = match routing.kind.server() {
            Some(server) => {
                self.exchange
                    .cancel_stop_order(server, &routing.portfolio, &number)
                    .await
            }
            None => {
                self.exchange
                    .cancel_order(&routing.portfolio, &exchange, &number)
                    .await
            }
        };
        match result {
            Ok(()) => info!(order_ref = %reference, order_number = %number, "Cancel requested"),
            Err(error) => warn!(
                order_ref = %reference,
                order_number = %number,
                %error,
                "Cancel request failed"
            ),
        }
        CancelOutcome::Requested
    }
}
