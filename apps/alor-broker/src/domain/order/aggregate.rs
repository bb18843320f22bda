//! Order Aggregate Root
//!
//! The order carries the strategy's intent, the routing binding produced by
//! validation, and the execution state updated from push events.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::OrderError;
use super::request::OrderRequest;
use super::state_machine::OrderStateMachine;
use super::value_objects::{
    ExecType, Execution, Fill, OrderSide, OrderStatus, RejectReason, Routing, TimeInForce,
};
use crate::domain::shared::{
    InstrumentId, OrderNumber, OrderRef, PortfolioId, ServerCode, StrategyId,
};

/// Order Aggregate Root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    reference: OrderRef,
    side: OrderSide,
    instrument: InstrumentId,
    exec_type: ExecType,
    size: Decimal,
    price: Option<Decimal>,
    price_limit: Option<Decimal>,
    time_in_force: TimeInForce,
    owner: Option<StrategyId>,
    parent: Option<OrderRef>,
    transmit: bool,
    oco: Option<OrderRef>,
    portfolio_override: Option<PortfolioId>,
    server_override: Option<ServerCode>,
    routing: Option<Routing>,
    order_number: Option<OrderNumber>,
    status: OrderStatus,
    reject_reason: Option<RejectReason>,
    execution: Execution,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Create an order in `Created` status.
    #[must_use]
    pub fn new(reference: OrderRef, side: OrderSide, request: OrderRequest) -> Self {
        let now = Utc::now();
        let size = side.signed(request.size);
        Self {
            reference,
            side,
            instrument: request.instrument,
            exec_type: request.exec_type,
            size,
            price: request.price,
            price_limit: request.price_limit,
            time_in_force: request.time_in_force,
            owner: request.owner,
            parent: request.parent,
            transmit: request.transmit,
            oco: request.oco,
            portfolio_override: request.portfolio,
            server_override: request.server,
            routing: None,
            order_number: None,
            status: OrderStatus::Created,
            reject_reason: None,
            execution: Execution::new(size),
            created_at: now,
            updated_at: now,
        }
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Local reference.
    #[must_use]
    pub const fn reference(&self) -> OrderRef {
        self.reference
    }

    /// Order side.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Instrument traded.
    #[must_use]
    pub const fn instrument(&self) -> &InstrumentId {
        &self.instrument
    }

    /// Requested execution type.
    #[must_use]
    pub const fn exec_type(&self) -> ExecType {
        self.exec_type
    }

    /// Signed requested size (negative for sells).
    #[must_use]
    pub const fn size(&self) -> Decimal {
        self.size
    }

    /// Limit or trigger price.
    #[must_use]
    pub const fn price(&self) -> Option<Decimal> {
        self.price
    }

    /// Stop-limit secondary price.
    #[must_use]
    pub const fn price_limit(&self) -> Option<Decimal> {
        self.price_limit
    }

    /// Time in force.
    #[must_use]
    pub const fn time_in_force(&self) -> TimeInForce {
        self.time_in_force
    }

    /// Owning strategy.
    #[must_use]
    pub const fn owner(&self) -> Option<&StrategyId> {
        self.owner.as_ref()
    }

    /// Bracket parent.
    #[must_use]
    pub const fn parent(&self) -> Option<OrderRef> {
        self.parent
    }

    /// Transmit flag.
    #[must_use]
    pub const fn transmit(&self) -> bool {
        self.transmit
    }

    /// One-cancels-other partner.
    #[must_use]
    pub const fn oco(&self) -> Option<OrderRef> {
        self.oco
    }

    /// Portfolio supplied with the request.
    #[must_use]
    pub const fn portfolio_override(&self) -> Option<&PortfolioId> {
        self.portfolio_override.as_ref()
    }

    /// Trading server supplied with the request.
    #[must_use]
    pub const fn server_override(&self) -> Option<&ServerCode> {
        self.server_override.as_ref()
    }

    /// Routing binding, set once validation passes.
    #[must_use]
    pub const fn routing(&self) -> Option<&Routing> {
        self.routing.as_ref()
    }

    /// Exchange-assigned number, set once accepted.
    #[must_use]
    pub const fn order_number(&self) -> Option<&OrderNumber> {
        self.order_number.as_ref()
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Why the order was rejected.
    #[must_use]
    pub const fn reject_reason(&self) -> Option<&RejectReason> {
        self.reject_reason.as_ref()
    }

    /// Execution state.
    #[must_use]
    pub const fn execution(&self) -> &Execution {
        &self.execution
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last status change.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true unless the order reached a terminal status.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.status.is_alive()
    }

    /// Returns true if the order belongs to a parent/children chain.
    #[must_use]
    pub const fn is_chain_member(&self) -> bool {
        self.parent.is_some() || !self.transmit
    }

    /// Returns true if the order opens a chain (held, without a parent).
    #[must_use]
    pub const fn is_chain_head(&self) -> bool {
        self.parent.is_none() && !self.transmit
    }

    /// Key of the chain this order belongs to: its parent, or itself.
    #[must_use]
    pub fn chain_key(&self) -> OrderRef {
        self.parent.unwrap_or(self.reference)
    }

    // ========================================================================
    // State Transitions
    // ========================================================================

    /// Attach the validated routing binding.
    pub fn bind(&mut self, routing: Routing) {
        self.routing = Some(routing);
    }

    /// Mark the creation call as issued for `routed` units.
    ///
    /// `routed` is the lot-rounded size actually sent; fills are counted
    /// against it.
    ///
    /// # Errors
    ///
    /// Returns error unless the order is `Created`.
    pub fn submit(&mut self, routed: Decimal) -> Result<(), OrderError> {
        self.transition_to(OrderStatus::Submitted)?;
        self.execution.remaining = routed.abs();
        Ok(())
    }

    /// Record the exchange-assigned number.
    ///
    /// # Errors
    ///
    /// Returns error unless the order is `Submitted`.
    pub fn accept(&mut self, order_number: OrderNumber) -> Result<(), OrderError> {
        self.transition_to(OrderStatus::Accepted)?;
        self.order_number = Some(order_number);
        Ok(())
    }

    /// Reject the order.
    ///
    /// # Errors
    ///
    /// Returns error if the order is terminal or already accepted past a fill.
    pub fn reject(&mut self, reason: RejectReason) -> Result<(), OrderError> {
        self.transition_to(OrderStatus::Rejected)?;
        self.reject_reason = Some(reason);
        Ok(())
    }

    /// Mark the order canceled.
    ///
    /// # Errors
    ///
    /// Returns error if the order is terminal or still in flight.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        self.transition_to(OrderStatus::Canceled)
    }

    /// Mark the order expired.
    ///
    /// # Errors
    ///
    /// Returns error unless the order is working on the exchange.
    pub fn expire(&mut self) -> Result<(), OrderError> {
        self.transition_to(OrderStatus::Expired)
    }

    /// Mark the order rejected for margin.
    ///
    /// # Errors
    ///
    /// Returns error unless the order is `Accepted`.
    pub fn margin(&mut self) -> Result<(), OrderError> {
        self.transition_to(OrderStatus::Margin)
    }

    /// Apply a fill, moving to `Partial` or `Completed`.
    ///
    /// # Errors
    ///
    /// Returns error if the order cannot be filled or the fill is larger
    /// than what remains.
    pub fn execute(&mut self, fill: Fill) -> Result<OrderStatus, OrderError> {
        if !self.status.can_fill() {
            return Err(OrderError::CannotFill {
                status: self.status,
            });
        }
        if fill.size.abs() > self.execution.remaining {
            return Err(OrderError::FillExceedsRemaining {
                fill: fill.size.abs().to_string(),
                remaining: self.execution.remaining.to_string(),
            });
        }

        self.execution.record(fill);
        let next = if self.execution.remaining.is_zero() {
            OrderStatus::Completed
        } else {
            OrderStatus::Partial
        };
        self.transition_to(next)?;
        Ok(next)
    }

    fn transition_to(&mut self, to: OrderStatus) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.status, to)?;
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }
}
