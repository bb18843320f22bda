//! Bracket request: entry plus protective stop and take-profit.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::order::{ExecType, OrderRequest, OrderSide, TimeInForce};
use crate::domain::shared::{InstrumentId, OrderRef, PortfolioId, StrategyId};

/// Bracket construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BracketError {
    /// Size must be positive.
    #[error("bracket size must be positive, got {0}")]
    InvalidSize(Decimal),

    /// Stop-loss and take-profit are on the wrong sides.
    #[error("{side} bracket needs stop {stop} on the losing side of take-profit {take_profit}")]
    InvertedExits {
        /// Entry side.
        side: OrderSide,
        /// Stop-loss trigger.
        stop: Decimal,
        /// Take-profit limit.
        take_profit: Decimal,
    },

    /// Entry type other than market or limit.
    #[error("bracket entry must be MARKET or LIMIT, got {0}")]
    UnsupportedEntry(ExecType),
}

/// A bracket: entry order, stop-loss and take-profit.
///
/// Both exits are children of the entry. The entry and the stop-loss are
/// held; the take-profit is created last with `transmit = true`, which
/// routes the entry. The exits are placed once the entry completes, and
/// whichever exit completes first cancels the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketRequest {
    /// Instrument to trade.
    pub instrument: InstrumentId,
    /// Unsigned size in units.
    pub size: Decimal,
    /// Entry execution type (market or limit).
    pub entry: ExecType,
    /// Entry limit price.
    pub entry_price: Option<Decimal>,
    /// Stop-loss trigger.
    pub stop_price: Decimal,
    /// Stop-loss limit once triggered; a plain stop when absent.
    pub stop_limit: Option<Decimal>,
    /// Take-profit limit.
    pub take_profit: Decimal,
    /// Time in force for every leg.
    pub time_in_force: TimeInForce,
    /// Explicit portfolio for every leg.
    pub portfolio: Option<PortfolioId>,
    /// Owning strategy.
    pub owner: Option<StrategyId>,
}

impl BracketRequest {
    /// Bracket with a market entry.
    #[must_use]
    pub fn market(
        instrument: InstrumentId,
        size: Decimal,
        stop_price: Decimal,
        take_profit: Decimal,
    ) -> Self {
        Self {
            instrument,
            size: size.abs(),
            entry: ExecType::Market,
            entry_price: None,
            stop_price,
            stop_limit: None,
            take_profit,
            time_in_force: TimeInForce::default(),
            portfolio: None,
            owner: None,
        }
    }

    /// Bracket with a limit entry.
    #[must_use]
    pub fn limit(
        instrument: InstrumentId,
        size: Decimal,
        price: Decimal,
        stop_price: Decimal,
        take_profit: Decimal,
    ) -> Self {
        Self {
            entry: ExecType::Limit,
            entry_price: Some(price),
            ..Self::market(instrument, size, stop_price, take_profit)
        }
    }

    /// Use a stop-limit for the stop-loss leg.
    #[must_use]
    pub const fn with_stop_limit(mut self, limit: Decimal) -> Self {
        self.stop_limit = Some(limit);
        self
    }

    /// Route every leg under `portfolio`.
    #[must_use]
    pub fn with_portfolio(mut self, portfolio: PortfolioId) -> Self {
        self.portfolio = Some(portfolio);
        self
    }

    /// Set the owning strategy.
    #[must_use]
    pub fn with_owner(mut self, owner: StrategyId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Check the bracket is coherent for an entry on `side`.
    ///
    /// # Errors
    ///
    /// Returns error on a non-positive size, an entry type other than
    /// market or limit, or exits on the wrong sides of each other.
    pub fn validate(&self, side: OrderSide) -> Result<(), BracketError> {
        if self.size <= Decimal::ZERO {
            return Err(BracketError::InvalidSize(self.size));
        }
        if !matches!(self.entry, ExecType::Market | ExecType::Limit) {
            return Err(BracketError::UnsupportedEntry(self.entry));
        }
        let inverted = match side {
            OrderSide::Buy => self.stop_price >= self.take_profit,
            OrderSide::Sell => self.stop_price <= self.take_profit,
        };
        if inverted {
            return Err(BracketError::InvertedExits {
                side,
                stop: self.stop_price,
                take_profit: self.take_profit,
            });
        }
        Ok(())
    }

    /// Held entry order.
    #[must_use]
    pub fn entry_request(&self) -> OrderRequest {
        let mut request = self.leg(OrderRequest::new(
            self.instrument.clone(),
            self.size,
            self.entry,
        ));
        request.price = self.entry_price;
        request.hold()
    }

    /// Held stop-loss child of `parent`.
    #[must_use]
    pub fn stop_loss_request(&self, parent: OrderRef) -> OrderRequest {
        let request = match self.stop_limit {
            Some(limit) => {
                OrderRequest::stop_limit(self.instrument.clone(), self.size, self.stop_price, limit)
            }
            None => OrderRequest::stop(self.instrument.clone(), self.size, self.stop_price),
        };
        self.leg(request).with_parent(parent).hold()
    }

    /// Transmitting take-profit child of `parent`.
    #[must_use]
    pub fn take_profit_request(&self, parent: OrderRef) -> OrderRequest {
        self.leg(OrderRequest::limit(
            self.instrument.clone(),
            self.size,
            self.take_profit,
        ))
        .with_parent(parent)
        .transmit(true)
    }

    fn leg(&self, mut request: OrderRequest) -> OrderRequest {
        request.time_in_force = self.time_in_force;
        request.portfolio.clone_from(&self.portfolio);
        request.owner.clone_from(&self.owner);
        request
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
    fn legs_are_linked_and_only_take_profit_transmits() {
        let bracket = BracketRequest::limit(sber(), dec!(10), dec!(250), dec!(245), dec!(260));
        let parent = OrderRef::new(7);

        let entry = bracket.entry_request();
        assert_eq!(entry.exec_type, ExecType::Limit);
        assert_eq!(entry.price, Some(dec!(250)));
        assert!(!entry.transmit);
        assert!(entry.parent.is_none());

        let stop = bracket.stop_loss_request(parent);
        assert_eq!(stop.exec_type, ExecType::Stop);
        assert_eq!(stop.parent, Some(parent));
        assert!(!stop.transmit);

        let take = bracket.take_profit_request(parent);
        assert_eq!(take.exec_type, ExecType::Limit);
        assert_eq!(take.price, Some(dec!(260)));
        assert!(take.transmit);
    }

    #[test]
    fn stop_limit_leg() {
        let bracket = BracketRequest::market(sber(), dec!(10), dec!(245), dec!(260))
            .with_stop_limit(dec!(244));
        let stop = bracket.stop_loss_request(OrderRef::new(1));
        assert_eq!(stop.exec_type, ExecType::StopLimit);
        assert_eq!(stop.price_limit, Some(dec!(244)));
    }

    #[test]
    fn validate_checks_exit_sides() {
        let buy = BracketRequest::market(sber(), dec!(10), dec!(245), dec!(260));
        assert!(buy.validate(OrderSide::Buy).is_ok());
        assert!(matches!(
            buy.validate(OrderSide::Sell),
            Err(BracketError::InvertedExits { .. })
        ));
    }

    #[test]
    fn validate_rejects_empty_size() {
        let bracket = BracketRequest::market(sber(), dec!(0), dec!(245), dec!(260));
        assert_eq!(
            bracket.validate(OrderSide::Buy),
            Err(BracketError::InvalidSize(dec!(0)))
        );
    }
}
