//! Broker routing tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::shared::{Board, Exchange, PortfolioId, ServerCode};

/// Portfolio and trading server bound to a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardBinding {
    /// Portfolio orders on this board are placed under.
    pub portfolio: PortfolioId,
    /// Trading server for stop orders on this board.
    #[serde(default)]
    pub server: Option<ServerCode>,
}

/// Static tables the broker routes with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerSettings {
    /// Seed positions from snapshots on start.
    pub use_positions: bool,
    /// Board to portfolio/server table.
    pub boards: BTreeMap<Board, BoardBinding>,
    /// Portfolio to exchanges table.
    pub accounts: BTreeMap<PortfolioId, Vec<Exchange>>,
    /// Boards quoted as bonds.
    pub bond_boards: Vec<Board>,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            use_positions: true,
            boards: BTreeMap::new(),
            accounts: BTreeMap::new(),
            bond_boards: vec![Board::new("TQOB")],
        }
    }
}

impl BrokerSettings {
    /// Bind `board` to a portfolio and optional server.
    #[must_use]
    pub fn with_board(
        mut self,
        board: impl Into<Board>,
        portfolio: impl Into<PortfolioId>,
        server: Option<ServerCode>,
    ) -> Self {
        self.boards.insert(
            board.into(),
            BoardBinding {
                portfolio: portfolio.into(),
                server,
            },
        );
        self
    }

    /// Declare the exchanges a portfolio trades on.
    #[must_use]
    pub fn with_account(
        mut self,
        portfolio: impl Into<PortfolioId>,
        exchanges: impl IntoIterator<Item = Exchange>,
    ) -> Self {
        self.accounts
            .insert(portfolio.into(), exchanges.into_iter().collect());
        self
    }

    /// Portfolio bound to `board`.
    #[must_use]
    pub fn portfolio_for(&self, board: &Board) -> Option<&PortfolioId> {
        self.boards.get(board).map(|binding| &binding.portfolio)
    }

    /// Trading server bound to `board`.
    #[must_use]
    pub fn server_for(&self, board: &Board) -> Option<&ServerCode> {
        self.boards
            .get(board)
            .and_then(|binding| binding.server.as_ref())
    }

    /// (portfolio, exchange) pairs, optionally limited to one portfolio.
    #[must_use]
    pub fn pairs(&self, portfolio: Option<&PortfolioId>) -> Vec<(PortfolioId, Exchange)> {
        self.accounts
            .iter()
            .filter(|(p, _)| portfolio.is_none_or(|wanted| *p == wanted))
            .flat_map(|(p, exchanges)| {
                exchanges
                    .iter()
                    .map(move |exchange| (p.clone(), exchange.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> BrokerSettings {
        BrokerSettings::default()
            .with_board("TQBR", "D12345", Some(ServerCode::new("TRADE")))
            .with_board("RFUD", "7500PST", None)
            .with_account("D12345", [Exchange::new("MOEX"), Exchange::new("SPBX")])
            .with_account("7500PST", [Exchange::new("MOEX")])
    }

    #[test]
    fn board_lookups() {
        let settings = settings();
        assert_eq!(
            settings.portfolio_for(&Board::new("TQBR")).map(PortfolioId::as_str),
            Some("D12345")
        );
        assert_eq!(
            settings.server_for(&Board::new("TQBR")).map(ServerCode::as_str),
            Some("TRADE")
        );
        assert!(settings.server_for(&Board::new("RFUD")).is_none());
        assert!(settings.portfolio_for(&Board::new("TQOB")).is_none());
    }

    #[test]
    fn pairs_enumerate_accounts() {
        let settings = settings();
        assert_eq!(settings.pairs(None).len(), 3);
        let scoped = settings.pairs(Some(&PortfolioId::new("D12345")));
        assert_eq!(scoped.len(), 2);
        assert!(scoped.iter().all(|(p, _)| p.as_str() == "D12345"));
    }

    #[test]
    fn default_bond_board() {
        assert_eq!(BrokerSettings::default().bond_boards, vec![Board::new("TQOB")]);
        assert!(BrokerSettings::default().use_positions);
    }
}
