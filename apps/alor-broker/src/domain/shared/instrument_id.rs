//! Instrument identity: exchange plus symbol.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Exchange, Symbol};

/// Errors parsing an instrument data name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstrumentIdError {
    /// The name has no symbol part.
    #[error("instrument name is empty")]
    Empty,
}

/// Identity of a tradeable instrument.
///
/// The textual form is the data name `EXCHANGE.SYMBOL` (`MOEX.SBER`,
/// `MOEX.SI-6.23`). A name without a recognised exchange prefix is taken to
/// be a MOEX symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstrumentId {
    /// Exchange code.
    pub exchange: Exchange,
    /// Exchange symbol.
    pub symbol: Symbol,
}

/// Exchanges recognised as a data-name prefix.
const KNOWN_EXCHANGES: [&str; 2] = ["MOEX", "SPBX"];

/// Exchange assumed when a data name has no prefix.
const DEFAULT_EXCHANGE: &str = "MOEX";

impl InstrumentId {
    /// Create an instrument identity.
    #[must_use]
    pub fn new(exchange: impl Into<Exchange>, symbol: impl Into<Symbol>) -> Self {
        Self {
            exchange: exchange.into(),
            symbol: symbol.into(),
        }
    }

    /// Data name used by the strategy layer.
    #[must_use]
    pub fn data_name(&self) -> String {
        format!("{}.{}", self.exchange, self.symbol)
    }
}

impl FromStr for InstrumentId {
    type Err = InstrumentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InstrumentIdError::Empty);
        }
        if let Some((prefix, rest)) = s.split_once('.') {
            if KNOWN_EXCHANGES.contains(&prefix) {
                if rest.is_empty() {
                    return Err(InstrumentIdError::Empty);
                }
                return Ok(Self::new(prefix, rest));
            }
        }
        Ok(Self::new(DEFAULT_EXCHANGE, s))
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.exchange, self.symbol)
    }
}
