//! Strategy order intent.

use rust_decimal::Decimal;

use super::value_objects::{ExecType, TimeInForce};
use crate::domain::shared::{InstrumentId, OrderRef, PortfolioId, ServerCode, StrategyId};

/// Order intent as expressed by a strategy, before validation.
///
/// `size` is unsigned: the side comes from the call (`buy` or `sell`).
/// Bracket members are built with [`OrderRequest::hold`] for every member
/// but the last, which keeps the default `transmit = true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    /// Instrument to trade.
    pub instrument: InstrumentId,
    /// Unsigned size in units (shares, contracts).
    pub size: Decimal,
    /// Requested execution type.
    pub exec_type: ExecType,
    /// Limit price (limit) or trigger price (stop kinds).
    pub price: Option<Decimal>,
    /// Limit price once a stop-limit triggers.
    pub price_limit: Option<Decimal>,
    /// Time in force.
    pub time_in_force: TimeInForce,
    /// Parent order of a bracket chain.
    pub parent: Option<OrderRef>,
    /// One-cancels-other partner.
    pub oco: Option<OrderRef>,
    /// Route immediately (`true`) or hold in the chain.
    pub transmit: bool,
    /// Owning strategy.
    pub owner: Option<StrategyId>,
    /// Explicit portfolio, overriding the board table.
    pub portfolio: Option<PortfolioId>,
    /// Explicit trading server, overriding the board table.
    pub server: Option<ServerCode>,
}

impl OrderRequest {
    /// Intent with the given execution type and no prices.
    #[must_use]
    pub fn new(instrument: InstrumentId, size: Decimal, exec_type: ExecType) -> Self {
        Self {
            instrument,
            size: size.abs(),
            exec_type,
            price: None,
            price_limit: None,
            time_in_force: TimeInForce::default(),
            parent: None,
            oco: None,
            transmit: true,
            owner: None,
            portfolio: None,
            server: None,
        }
    }

    /// Market order intent.
    #[must_use]
    pub fn market(instrument: InstrumentId, size: Decimal) -> Self {
        Self::new(instrument, size, ExecType::Market)
    }

    /// Limit order intent.
    #[must_use]
    pub fn limit(instrument: InstrumentId, size: Decimal, price: Decimal) -> Self {
        Self::new(instrument, size, ExecType::Limit).with_price(price)
    }

    /// Stop order intent.
    #[must_use]
    pub fn stop(instrument: InstrumentId, size: Decimal, trigger: Decimal) -> Self {
        Self::new(instrument, size, ExecType::Stop).with_price(trigger)
    }

    /// Stop-limit order intent.
    #[must_use]
    pub fn stop_limit(
        instrument: InstrumentId,
        size: Decimal,
        trigger: Decimal,
        limit: Decimal,
    ) -> Self {
        Self::new(instrument, size, ExecType::StopLimit)
            .with_price(trigger)
            .with_price_limit(limit)
    }

    /// Set the limit/trigger price.
    #[must_use]
    pub const fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the stop-limit secondary price.
    #[must_use]
    pub const fn with_price_limit(mut self, price: Decimal) -> Self {
        self.price_limit = Some(price);
        self
    }

    /// Attach to a bracket parent.
    #[must_use]
    pub const fn with_parent(mut self, parent: OrderRef) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Pair with a one-cancels-other partner.
    #[must_use]
    pub const fn with_oco(mut self, partner: OrderRef) -> Self {
        self.oco = Some(partner);
        self
    }

    /// Set the transmit flag.
    #[must_use]
    pub const fn transmit(mut self, transmit: bool) -> Self {
        self.transmit = transmit;
        self
    }

    /// Hold the order in its chain instead of routing it.
    #[must_use]
    pub const fn hold(self) -> Self {
        self.transmit(false)
    }

    /// Set the owning strategy.
    #[must_use]
    pub fn with_owner(mut self, owner: StrategyId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Route under an explicit portfolio.
    #[must_use]
    pub fn with_portfolio(mut self, portfolio: PortfolioId) -> Self {
        self.portfolio = Some(portfolio);
        self
    }

    /// Route stops through an explicit trading server.
    #[must_use]
    pub fn with_server(mut self, server: ServerCode) -> Self {
        self.server = Some(server);
        self
    }

    /// Set the time in force.
    #[must_use]
    pub const fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = time_in_force;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sber() -> InstrumentId {
        InstrumentId::new("MOEX", "SBER")
    }

    #[test]
    fn constructors_set_prices() {
        let request = OrderRequest::stop_limit(sber(), dec!(10), dec!(250), dec!(249.5));
        assert_eq!(request.exec_type, ExecType::StopLimit);
        assert_eq!(request.price, Some(dec!(250)));
        assert_eq!(request.price_limit, Some(dec!(249.5)));
        assert!(request.transmit);
    }

    #[test]
    fn size_is_unsigned() {
        let request = OrderRequest::market(sber(), dec!(-10));
        assert_eq!(request.size, dec!(10));
    }

    #[test]
    fn hold_clears_transmit() {
        let request = OrderRequest::limit(sber(), dec!(10), dec!(250))
            .with_parent(OrderRef::new(1))
            .hold();
        assert!(!request.transmit);
        assert_eq!(request.parent, Some(OrderRef::new(1)));
    }
}
