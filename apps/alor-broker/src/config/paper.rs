//! Paper session configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::instrument::SymbolInfo;
use crate::domain::shared::{AccountId, Exchange, PortfolioId};

/// `paper` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperConfig {
    /// Instruments the paper exchange publishes.
    #[serde(default)]
    pub instruments: Vec<SymbolInfo>,
    /// Portfolios with their starting cash.
    #[serde(default)]
    pub portfolios: Vec<PaperPortfolio>,
    /// Interval between broker ticks, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            instruments: Vec::new(),
            portfolios: Vec::new(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// One paper portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperPortfolio {
    /// Portfolio code.
    pub portfolio: PortfolioId,
    /// Trading account.
    pub account: AccountId,
    /// Exchange the cash is held on.
    pub exchange: Exchange,
    /// Starting cash.
    #[serde(default)]
    pub cash: Decimal,
}

const fn default_tick_interval_ms() -> u64 {
    1000
}
