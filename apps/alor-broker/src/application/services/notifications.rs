//! Notification Queue
//!
//! FIFO of order snapshots drained by the strategy once per tick.

use std::collections::VecDeque;

use crate::domain::order::Order;

/// Queue entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Snapshot of an order at the moment it changed.
    Order(Box<Order>),
    /// End of the events belonging to one tick.
    TickBoundary,
}

impl Notification {
    /// The order snapshot, if this is not a boundary.
    #[must_use]
    pub fn order(&self) -> Option<&Order> {
        match self {
            Self::Order(order) => Some(order),
            Self::TickBoundary => None,
        }
    }
}

/// FIFO of notifications.
///
/// Orders are cloned on push, so later changes to the live order never
/// touch a queued snapshot.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    queue: VecDeque<Notification>,
}

impl NotificationQueue {
    /// Empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a snapshot of `order`.
    pub fn push_order(&mut self, order: &Order) {
        self.queue.push_back(Notification::Order(Box::new(order.clone())));
    }

    /// Mark the end of a tick.
    pub fn push_boundary(&mut self) {
        self.queue.push_back(Notification::TickBoundary);
    }

    /// Oldest notification.
    pub fn pop(&mut self) -> Option<Notification> {
        self.queue.pop_front()
    }

    /// Order snapshots up to and including the next boundary.
    ///
    /// Stops at the boundary, leaving later ticks queued.
    pub fn drain_tick(&mut self) -> Vec<Order> {
        let mut orders = Vec::new();
        while let Some(notification) = self.queue.pop_front() {
            match notification {
                Notification::Order(order) => orders.push(*order),
                Notification::TickBoundary => break,
            }
        }
        orders
    }

    /// Number of queued entries, boundaries included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderRequest, OrderSide, OrderStatus, RejectReason};
    use crate::domain::shared::{InstrumentId, OrderRef};
    use rust_decimal_macros::dec;

    fn order(reference: u64) -> Order {
        Order::new(
            OrderRef::new(reference),
            OrderSide::Buy,
            OrderRequest::market(InstrumentId::new("MOEX", "SBER"), dec!(10)),
        )
    }

    #[test]
    fn fifo_with_boundary() {
        let mut queue = NotificationQueue::new();
        queue.push_order(&order(1));
        queue.push_order(&order(2));
        queue.push_boundary();

        assert_eq!(
            queue.pop().and_then(|n| n.order().map(Order::reference)),
            Some(OrderRef::new(1))
        );
        assert_eq!(
            queue.pop().and_then(|n| n.order().map(Order::reference)),
            Some(OrderRef::new(2))
        );
        assert_eq!(queue.pop(), Some(Notification::TickBoundary));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn queued_snapshot_is_isolated_from_live_order() {
        let mut queue = NotificationQueue::new();
        let mut live = order(1);
        queue.push_order(&live);

        live.reject(RejectReason::instrument_not_found("MOEX.SBER"))
            .unwrap();

        let Some(Notification::Order(snapshot)) = queue.pop() else {
            panic!("expected order notification");
        };
        assert_eq!(snapshot.status(), OrderStatus::Created);
        assert!(snapshot.reject_reason().is_none());
        assert_eq!(live.status(), OrderStatus::Rejected);
    }

    #[test]
    fn drain_tick_stops_at_boundary() {
        let mut queue = NotificationQueue::new();
        queue.push_order(&order(1));
        queue.push_boundary();
        queue.push_order(&order(2));
        queue.push_boundary();

        let first = queue.drain_tick();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].reference(), OrderRef::new(1));
        assert_eq!(queue.len(), 2);

        let second = queue.drain_tick();
        assert_eq!(second[0].reference(), OrderRef::new(2));
        assert!(queue.is_empty());
    }
}
