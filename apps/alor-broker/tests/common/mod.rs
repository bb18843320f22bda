//! Shared fixtures: a broker wired to a paper exchange.

#![allow(dead_code)]

use std::sync::Arc;

use alor_broker::application::ports::Money;
use alor_broker::{
    AccountId, Board, Broker, BrokerSettings, Exchange, InstrumentId, Order, OrderNumber,
    OrderRef, PaperExchange, PortfolioId, ServerCode, SymbolInfo, Symbol, push_channel,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const PORTFOLIO: &str = "D12345";
pub const ACCOUNT: &str = "L01-00000F00";

pub fn moex() -> Exchange {
    Exchange::new("MOEX")
}

pub fn portfolio() -> PortfolioId {
    PortfolioId::new(PORTFOLIO)
}

pub fn sber() -> InstrumentId {
    InstrumentId::new("MOEX", "SBER")
}

pub fn ofz() -> InstrumentId {
    InstrumentId::new("MOEX", "SU26238RMFS4")
}

pub fn aapl() -> InstrumentId {
    InstrumentId::new("SPBX", "AAPL")
}

fn info(exchange: &str, symbol: &str, board: &str, lot_size: Decimal) -> SymbolInfo {
    SymbolInfo {
        exchange: Exchange::new(exchange),
        symbol: Symbol::new(symbol),
        primary_board: Board::new(board),
        lot_size,
        min_step: dec!(0.01),
        price_multiplier: Decimal::ONE,
    }
}

/// SBER (lot 10, TQBR), an OFZ bond (lot 1, TQOB), AAPL on an unbound board.
pub fn paper_exchange() -> (PaperExchange, alor_broker::application::ports::PushReceiver) {
    let (tx, rx) = push_channel();
    let paper = PaperExchange::new(tx)
        .with_instrument(info("MOEX", "SBER", "TQBR", dec!(10)))
        .with_instrument(info("MOEX", "SU26238RMFS4", "TQOB", dec!(1)))
        .with_instrument(info("SPBX", "AAPL", "SPBXM", dec!(1)))
        .with_portfolio(portfolio(), AccountId::new(ACCOUNT))
        .with_money(
            portfolio(),
            moex(),
            Money {
                portfolio: dec!(100000),
                cash: dec!(100000),
            },
        );
    (paper, rx)
}

/// TQBR routes with a trading server, TQOB without one.
pub fn settings() -> BrokerSettings {
    BrokerSettings::default()
        .with_board("TQBR", PORTFOLIO, Some(ServerCode::new("TRADE")))
        .with_board("TQOB", PORTFOLIO, None)
        .with_account(PORTFOLIO, [moex()])
}

pub struct Harness {
    pub paper: Arc<PaperExchange>,
    pub broker: Broker<PaperExchange>,
}

impl Harness {
    pub async fn started() -> Self {
        let (paper, rx) = paper_exchange();
        Self::start_with(paper, rx).await
    }

    pub async fn start_with(
        paper: PaperExchange,
        rx: alor_broker::application::ports::PushReceiver,
    ) -> Self {
        let paper = Arc::new(paper);
        let mut broker = Broker::new(Arc::clone(&paper), settings(), rx);
        broker.start().await;
        Self { paper, broker }
    }

    /// Apply pushes, close the tick, and return its notifications.
    pub async fn tick(&mut self) -> Vec<Order> {
        self.broker.next().await;
        self.broker.drain_notifications()
    }

    pub fn order(&self, reference: OrderRef) -> &Order {
        self.broker.order(reference).unwrap()
    }

    pub fn number(&self, reference: OrderRef) -> OrderNumber {
        self.order(reference).order_number().unwrap().clone()
    }

    /// Fill every remaining lot of `reference` at `price` and apply it.
    pub async fn fill_all(&mut self, reference: OrderRef, price: Decimal) -> Vec<Order> {
        let number = self.number(reference);
        let lots = self.paper.order(&number).unwrap().remaining_lots();
        self.paper.fill(&number, lots, price).unwrap();
        self.tick().await
    }

    pub fn created_count(&self) -> usize {
        self.paper.orders().len()
    }
}
