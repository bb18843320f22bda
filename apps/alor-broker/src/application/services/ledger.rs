//! Cash Ledger
//!
//! Free cash and non-cash value per (portfolio, exchange).

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::domain::position::CashValue;
use crate::domain::shared::{Exchange, PortfolioId};

/// Ledger key.
pub type LedgerKey = (PortfolioId, Exchange);

/// Cash/value per (portfolio, exchange).
#[derive(Debug, Clone, Default)]
pub struct CashLedger {
    entries: BTreeMap<LedgerKey, CashValue>,
}

impl CashLedger {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the pair has been recorded.
    #[must_use]
    pub fn contains(&self, portfolio: &PortfolioId, exchange: &Exchange) -> bool {
        self.entries
            .contains_key(&(portfolio.clone(), exchange.clone()))
    }

    /// Recorded entry for the pair.
    #[must_use]
    pub fn get(&self, portfolio: &PortfolioId, exchange: &Exchange) -> Option<CashValue> {
        self.entries
            .get(&(portfolio.clone(), exchange.clone()))
            .copied()
    }

    /// Overwrite the entry for the pair.
    pub fn record(&mut self, portfolio: PortfolioId, exchange: Exchange, entry: CashValue) {
        self.entries.insert((portfolio, exchange), entry);
    }

    /// Sum over `pairs`. Pairs never recorded contribute nothing, and
    /// recorded pairs outside `pairs` are ignored.
    #[must_use]
    pub fn total_of(&self, pairs: &[LedgerKey]) -> CashValue {
        pairs
            .iter()
            .filter_map(|key| self.entries.get(key))
            .copied()
            .sum()
    }

    /// Number of recorded pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
