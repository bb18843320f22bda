//! Paper order book: working orders and price-driven matching.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::ports::NewOrder;
use crate::domain::order::OrderSide;
use crate::domain::shared::{OrderNumber, ServerCode};

/// Kind and prices of a paper order, exchange units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperOrderKind {
    /// Market order.
    Market,
    /// Limit order.
    Limit {
        /// Limit price.
        price: Decimal,
    },
    /// Stop-market order.
    Stop {
        /// Trigger price.
        trigger: Decimal,
        /// Trading server.
        server: ServerCode,
    },
    /// Stop-limit order.
    StopLimit {
        /// Trigger price.
        trigger: Decimal,
        /// Limit once triggered.
        limit: Decimal,
        /// Trading server.
        server: ServerCode,
    },
}

impl PaperOrderKind {
    /// Returns true for stop kinds.
    #[must_use]
    pub const fn is_stop(&self) -> bool {
        matches!(self, Self::Stop { .. } | Self::StopLimit { .. })
    }
}

/// Lifecycle of a paper order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperOrderState {
    /// On the book.
    Working,
    /// Cancel requested, confirmation not yet pushed.
    CancelPending,
    /// Fully filled.
    Filled,
    /// Canceled.
    Canceled,
    /// Expired.
    Expired,
    /// Rejected after acceptance.
    Rejected,
}

/// An order held by the paper exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperOrder {
    /// Assigned number.
    pub number: OrderNumber,
    /// Creation request.
    pub request: NewOrder,
    /// Kind and prices.
    pub kind: PaperOrderKind,
    /// Current state.
    pub state: PaperOrderState,
    /// Filled lots.
    pub filled_lots: Decimal,
}

impl PaperOrder {
    /// Lots still open.
    #[must_use]
    pub fn remaining_lots(&self) -> Decimal {
        self.request.quantity - self.filled_lots
    }

    /// Returns true while the order can trade.
    #[must_use]
    pub const fn is_working(&self) -> bool {
        matches!(self.state, PaperOrderState::Working)
    }

    /// Execution price if `last` trades through the order.
    ///
    /// Market orders fill at `last`, limits at `last` when it is at or
    /// better than the limit, stops at `last` once triggered, stop-limits
    /// like a limit once triggered.
    #[must_use]
    pub fn execution_price(&self, last: Decimal) -> Option<Decimal> {
        let side = self.request.side;
        let limit_ok = |limit: Decimal| match side {
            OrderSide::Buy => last <= limit,
            OrderSide::Sell => last >= limit,
        };
        let triggered = |trigger: Decimal| match side {
            OrderSide::Buy => last >= trigger,
            OrderSide::Sell => last <= trigger,
        };
        match &self.kind {
            PaperOrderKind::Market => Some(last),
            PaperOrderKind::Limit { price } => limit_ok(*price).then_some(last),
            PaperOrderKind::Stop { trigger, .. } => triggered(*trigger).then_some(last),
            PaperOrderKind::StopLimit { trigger, limit, .. } => {
                (triggered(*trigger) && limit_ok(*limit)).then_some(last)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::TimeInForce;
    use crate::domain::shared::{AccountId, Board, Exchange, PortfolioId, Symbol};
    use rust_decimal_macros::dec;
    use test_case::test_case;

    fn order(side: OrderSide, kind: PaperOrderKind) -> PaperOrder {
        PaperOrder {
            number: OrderNumber::new("1"),
            request: NewOrder {
                account: AccountId::new("L01-00000F00"),
                portfolio: PortfolioId::new("D12345"),
                exchange: Exchange::new("MOEX"),
                symbol: Symbol::new("SBER"),
                board: Board::new("TQBR"),
                side,
                quantity: dec!(3),
                time_in_force: TimeInForce::OneDay,
            },
            kind,
            state: PaperOrderState::Working,
            filled_lots: dec!(1),
        }
    }

    fn server() -> ServerCode {
        ServerCode::new("TRADE")
    }

    #[test_case(OrderSide::Buy, PaperOrderKind::Market, dec!(250), Some(dec!(250)) ; "market fills at last")]
    #[test_case(OrderSide::Buy, PaperOrderKind::Limit { price: dec!(249) }, dec!(250), None ; "buy limit above last waits")]
    #[test_case(OrderSide::Buy, PaperOrderKind::Limit { price: dec!(251) }, dec!(250), Some(dec!(250)) ; "buy limit fills")]
    #[test_case(OrderSide::Sell, PaperOrderKind::Limit { price: dec!(251) }, dec!(250), None ; "sell limit waits")]
    #[test_case(OrderSide::Sell, PaperOrderKind::Stop { trigger: dec!(245), server: server() }, dec!(244), Some(dec!(244)) ; "sell stop triggers")]
    #[test_case(OrderSide::Sell, PaperOrderKind::Stop { trigger: dec!(245), server: server() }, dec!(246), None ; "sell stop waits")]
    #[test_case(OrderSide::Buy, PaperOrderKind::StopLimit { trigger: dec!(255), limit: dec!(256), server: server() }, dec!(257), None ; "buy stop limit past limit waits")]
    fn execution_price(side: OrderSide, kind: PaperOrderKind, last: Decimal, expected: Option<Decimal>) {
        assert_eq!(order(side, kind).execution_price(last), expected);
    }

    #[test]
    fn remaining_lots() {
        assert_eq!(order(OrderSide::Buy, PaperOrderKind::Market).remaining_lots(), dec!(2));
    }
}
