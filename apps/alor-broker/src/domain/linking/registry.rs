//! OCO and parent/children registries.

use std::collections::BTreeMap;

use crate::domain::order::{Order, OrderStatus};
use crate::domain::shared::OrderRef;

/// Action the broker must carry out on a linked order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkAction {
    /// Cancel the order (no-op if it is no longer alive).
    Cancel(OrderRef),
    /// Route a held child to the exchange.
    Place(OrderRef),
}

impl LinkAction {
    /// Order the action targets.
    #[must_use]
    pub const fn target(&self) -> OrderRef {
        match self {
            Self::Cancel(reference) | Self::Place(reference) => *reference,
        }
    }

    /// Metrics label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cancel(_) => "cancel",
            Self::Place(_) => "place",
        }
    }
}

/// The facts reconciliation needs about the order that just changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Order that changed.
    pub reference: OrderRef,
    /// Its new status.
    pub status: OrderStatus,
    /// Its bracket parent.
    pub parent: Option<OrderRef>,
    /// Its transmit flag.
    pub transmit: bool,
}

impl From<&Order> for Transition {
    fn from(order: &Order) -> Self {
        Self {
            reference: order.reference(),
            status: order.status(),
            parent: order.parent(),
            transmit: order.transmit(),
        }
    }
}

impl Transition {
    const fn is_chain_head(&self) -> bool {
        self.parent.is_none() && !self.transmit
    }
}

/// OCO map and parent/children chains.
///
/// A chain is keyed by its head's reference and lists members in creation
/// order, head first. Entries are pruned as soon as they can no longer
/// produce an action, so the registries stay bounded by the number of live
/// linked orders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkedOrders {
    oco: BTreeMap<OrderRef, OrderRef>,
    chains: BTreeMap<OrderRef, Vec<OrderRef>>,
}

impl LinkedOrders {
    /// Empty registries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair `order` with `partner`.
    pub fn register_oco(&mut self, order: OrderRef, partner: OrderRef) {
        self.oco.insert(order, partner);
    }

    /// OCO partner of `order`, looking in both directions.
    #[must_use]
    pub fn oco_partner(&self, order: OrderRef) -> Option<OrderRef> {
        self.oco.get(&order).copied().or_else(|| {
            self.oco
                .iter()
                .find_map(|(key, value)| (*value == order).then_some(*key))
        })
    }

    /// Returns true if `head` opens a registered chain.
    #[must_use]
    pub fn has_chain(&self, head: OrderRef) -> bool {
        self.chains.contains_key(&head)
    }

    /// Members of the chain opened by `head`, head first.
    #[must_use]
    pub fn chain(&self, head: OrderRef) -> Option<&[OrderRef]> {
        self.chains.get(&head).map(Vec::as_slice)
    }

    /// Append `order` to the chain opened by `head`, creating it if needed.
    pub fn enqueue(&mut self, head: OrderRef, order: OrderRef) {
        let members = self.chains.entry(head).or_default();
        if !members.contains(&order) {
            members.push(order);
        }
    }

    /// Number of OCO entries.
    #[must_use]
    pub fn oco_len(&self) -> usize {
        self.oco.len()
    }

    /// Number of chains.
    #[must_use]
    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    /// Returns true if both registries are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.oco.is_empty() && self.chains.is_empty()
    }

    /// Returns true if `order` appears in either registry.
    #[must_use]
    pub fn references(&self, order: OrderRef) -> bool {
        self.oco
            .iter()
            .any(|(key, value)| *key == order || *value == order)
            || self
                .chains
                .iter()
                .any(|(head, members)| *head == order || members.contains(&order))
    }

    /// Decide what happens to linked orders after `changed` reached a
    /// terminal status.
    ///
    /// 1. Every OCO entry whose partner is `changed` cancels its key.
    /// 2. The partner registered under `changed` is canceled.
    /// 3. A completed chain head places every other member; a head that
    ///    ended any other way cancels them.
    /// 4. Otherwise a chain member cancels its siblings.
    ///
    /// `status_of` reports the current status of other orders and is used
    /// to drop chains whose members are all terminal. Unknown orders count
    /// as terminal.
    pub fn reconcile<F>(&mut self, changed: &Transition, status_of: F) -> Vec<LinkAction>
    where
        F: Fn(OrderRef) -> Option<OrderStatus>,
    {
        let mut actions = Vec::new();
        if changed.status.is_alive() {
            return actions;
        }
        let me = changed.reference;

        let pointing_at_me: Vec<OrderRef> = self
            .oco
            .iter()
            .filter_map(|(key, value)| (*value == me).then_some(*key))
            .collect();
        for key in pointing_at_me {
            self.oco.remove(&key);
            actions.push(LinkAction::Cancel(key));
        }
        if let Some(partner) = self.oco.remove(&me) {
            actions.push(LinkAction::Cancel(partner));
        }

        let chain_key = if changed.is_chain_head() {
            if let Some(members) = self.chains.get(&me) {
                let others = members.iter().copied().filter(|member| *member != me);
                if changed.status == OrderStatus::Completed {
                    actions.extend(others.map(LinkAction::Place));
                } else {
                    actions.extend(others.map(LinkAction::Cancel));
                }
            }
            Some(me)
        } else if let Some(parent) = changed.parent {
            if let Some(members) = self.chains.get(&parent) {
                actions.extend(
                    members
                        .iter()
                        .copied()
                        .filter(|member| *member != me && *member != parent)
                        .map(LinkAction::Cancel),
                );
            }
            Some(parent)
        } else {
            None
        };

        if let Some(key) = chain_key {
            self.prune_chain(key, me, &status_of);
        }
        actions
    }

    fn prune_chain<F>(&mut self, head: OrderRef, changed: OrderRef, status_of: &F)
    where
        F: Fn(OrderRef) -> Option<OrderStatus>,
    {
        let finished = self.chains.get(&head).is_some_and(|members| {
            members.iter().all(|member| {
                *member == changed || status_of(*member).is_none_or(|status| status.is_terminal())
            })
        });
        if finished {
            self.chains.remove(&head);
        }
    }
}
