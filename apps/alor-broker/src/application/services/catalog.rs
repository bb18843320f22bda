//! Instrument Catalog
//!
//! Caches symbol metadata fetched from the exchange and translates prices
//! with it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::debug;

use crate::application::ports::{ExchangeError, ExchangePort};
use crate::domain::instrument::{PriceTranslator, SymbolInfo};
use crate::domain::shared::InstrumentId;

/// Cached symbol metadata and price translation.
///
/// Only hits are cached: an instrument the exchange does not know is asked
/// for again on the next lookup.
pub struct InstrumentCatalog<E: ExchangePort> {
    exchange: Arc<E>,
    translator: PriceTranslator,
    cache: RwLock<HashMap<InstrumentId, SymbolInfo>>,
}

impl<E: ExchangePort> InstrumentCatalog<E> {
    /// Create a catalog backed by `exchange`.
    pub fn new(exchange: Arc<E>, translator: PriceTranslator) -> Self {
        Self {
            exchange,
            translator,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Price translator in use.
    pub const fn translator(&self) -> &PriceTranslator {
        &self.translator
    }

    /// Metadata for `instrument`.
    ///
    /// # Errors
    ///
    /// Returns error if the exchange call fails.
    pub async fn info(&self, instrument: &InstrumentId) -> Result<Option<SymbolInfo>, ExchangeError> {
        if let Some(info) = self.cache.read().get(instrument) {
            return Ok(Some(info.clone()));
        }

        let fetched = self
            .exchange
            .symbol_info(&instrument.exchange, &instrument.symbol)
            .await?;
        if let Some(info) = &fetched {
            debug!(instrument = %instrument, board = %info.primary_board, "Cached symbol info");
            self.cache.write().insert(instrument.clone(), info.clone());
        }
        Ok(fetched)
    }

    /// Metadata for `instrument`, treating a failed lookup as unknown.
    pub async fn lookup(&self, instrument: &InstrumentId) -> Option<SymbolInfo> {
        match self.info(instrument).await {
            Ok(info) => info,
            Err(error) => {
                tracing::warn!(instrument = %instrument, %error, "Symbol info lookup failed");
                None
            }
        }
    }

    /// Strategy price to exchange price.
    pub fn to_exchange_price(&self, info: &SymbolInfo, price: Decimal) -> Decimal {
        self.translator.to_exchange_price(info, price)
    }

    /// Exchange price to strategy price.
    pub fn to_local_price(&self, info: &SymbolInfo, price: Decimal) -> Decimal {
        self.translator.to_local_price(info, price)
    }

    /// Number of cached instruments.
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockExchangePort;
    use crate::domain::shared::{Board, Exchange, Symbol};
    use rust_decimal_macros::dec;

    fn sber_info() -> SymbolInfo {
        SymbolInfo {
            exchange: Exchange::new("MOEX"),
            symbol: Symbol::new("SBER"),
            primary_board: Board::new("TQBR"),
            lot_size: dec!(10),
            min_step: dec!(0.01),
            price_multiplier: Decimal::ONE,
        }
    }

    #[tokio::test]
    async fn caches_hits() {
        let mut exchange = MockExchangePort::new();
        exchange
            .expect_symbol_info()
            .times(1)
            .returning(|_, _| Ok(Some(sber_info())));
        let catalog = InstrumentCatalog::new(Arc::new(exchange), PriceTranslator::default());
        let sber = InstrumentId::new("MOEX", "SBER");

        assert_eq!(catalog.info(&sber).await.unwrap(), Some(sber_info()));
        assert_eq!(catalog.info(&sber).await.unwrap(), Some(sber_info()));
        assert_eq!(catalog.cached(), 1);
    }

    #[tokio::test]
    async fn misses_are_not_cached() {
        let mut exchange = MockExchangePort::new();
        exchange
            .expect_symbol_info()
            .times(2)
            .returning(|_, _| Ok(None));
        let catalog = InstrumentCatalog::new(Arc::new(exchange), PriceTranslator::default());
        let unknown = InstrumentId::new("MOEX", "NOPE");

        assert!(catalog.info(&unknown).await.unwrap().is_none());
        assert!(catalog.info(&unknown).await.unwrap().is_none());
        assert_eq!(catalog.cached(), 0);
    }

    #[tokio::test]
    async fn lookup_swallows_errors() {
        let mut exchange = MockExchangePort::new();
        exchange
            .expect_symbol_info()
            .returning(|_, _| Err(ExchangeError::transport("down")));
        let catalog = InstrumentCatalog::new(Arc::new(exchange), PriceTranslator::default());

        assert!(catalog.lookup(&InstrumentId::new("MOEX", "SBER")).await.is_none());
    }
}
