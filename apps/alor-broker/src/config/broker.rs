//! Broker routing configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::application::broker::{BoardBinding, BrokerSettings};
use crate::domain::shared::{Board, Exchange, PortfolioId};

/// `broker` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Seed positions from snapshots on start.
    #[serde(default = "default_true")]
    pub use_positions: bool,
    /// Board to portfolio/server bindings.
    #[serde(default)]
    pub boards: BTreeMap<Board, BoardBinding>,
    /// Exchanges traded per portfolio.
    #[serde(default)]
    pub accounts: BTreeMap<PortfolioId, Vec<Exchange>>,
    /// Boards quoted in tenths of percent of face value.
    #[serde(default = "default_bond_boards")]
    pub bond_boards: Vec<Board>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            use_positions: true,
            boards: BTreeMap::new(),
            accounts: BTreeMap::new(),
            bond_boards: default_bond_boards(),
        }
    }
}

impl From<&BrokerConfig> for BrokerSettings {
    fn from(config: &BrokerConfig) -> Self {
        Self {
            use_positions: config.use_positions,
            boards: config.boards.clone(),
            accounts: config.accounts.clone(),
            bond_boards: config.bond_boards.clone(),
        }
    }
}

pub(super) const fn default_true() -> bool {
    true
}

fn default_bond_boards() -> Vec<Board> {
    vec![Board::new("TQOB")]
}
