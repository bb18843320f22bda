//! Linked-order reconciliation driver.

use std::collections::VecDeque;

use tracing::debug;

use super::Broker;
use super::cancel::CancelOutcome;
use super::router::Routed;
use crate::application::ports::ExchangePort;
use crate::domain::linking::{LinkAction, Transition};
use crate::domain::order::Order;
use crate::domain::shared::OrderRef;
use crate::observability::metrics;

impl<E: ExchangePort> Broker<E> {
    /// Reconcile linked orders after `start` reached a terminal status.
    ///
    /// Actions run in the order the registries produce them, cancels of a
    /// pass before any later placement. Orders that turn terminal on the
    /// spot (held orders canceled locally, children rejected on placement)
    /// are reconciled in turn; everything else re-enters through push
    /// events.
    pub(super) async fn settle(&mut self, start: OrderRef) {
        let mut pending = VecDeque::from([start]);
        while let Some(reference) = pending.pop_front() {
            let Some(order) = self.orders.get(&reference) else {
                continue;
            };
            let transition = Transition::from(order);
            let orders = &self.orders;
            let actions = self
                .linked
                .reconcile(&transition, |other| orders.get(&other).map(Order::status));

            for action in actions {
                metrics::record_linked_action(action.label());
                debug!(order_ref = %reference, ?action, "Linked action");
                match action {
                    LinkAction::Cancel(target) => {
                        if self.cancel_order(target).await == CancelOutcome::CanceledLocally {
                            pending.push_back(target);
                        }
                    }
                    LinkAction::Place(target) => {
                        if self.route(target).await == Routed::Rejected {
                            pending.push_back(target);
                        }
                    }
                }
            }
        }
    }
}
