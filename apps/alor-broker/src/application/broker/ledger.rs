//! Account queries: cash, value, and position seeding.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::Broker;
use super::push::position_from_snapshot;
use crate::application::ports::ExchangePort;
use crate::application::services::LedgerKey;
use crate::domain::position::CashValue;
use crate::domain::shared::{InstrumentId, PortfolioId};

impl<E: ExchangePort> Broker<E> {
    /// Free cash across all configured pairs, or one portfolio's pairs.
    ///
    /// A pair seen for the first time is subscribed and seeded from a money
    /// snapshot.
    pub async fn getcash(&mut self, portfolio: Option<&PortfolioId>) -> Decimal {
        let pairs = self.ensure_ledger(portfolio).await;
        self.ledger.total_of(&pairs).cash
    }

    /// Non-cash value across all configured pairs, or one portfolio's pairs.
    pub async fn getvalue(&mut self, portfolio: Option<&PortfolioId>) -> Decimal {
        let pairs = self.ensure_ledger(portfolio).await;
        self.ledger.total_of(&pairs).value
    }

    /// Value of the positions held in `instruments`.
    ///
    /// Sums `volume + unrealised P&L × price multiplier` from single
    /// position snapshots. Instruments without metadata, portfolio or
    /// position contribute nothing.
    pub async fn value_of(&self, instruments: &[InstrumentId]) -> Decimal {
        let mut value = Decimal::ZERO;
        for instrument in instruments {
            let Some(info) = self.catalog.lookup(instrument).await else {
                continue;
            };
            let Some(portfolio) = self.settings.portfolio_for(&info.primary_board) else {
                continue;
            };
            match self
                .exchange
                .position(portfolio, &instrument.exchange, &instrument.symbol)
                .await
            {
                Ok(Some(position)) => {
                    value += position.volume + position.unrealised_pl * info.price_multiplier;
                }
                Ok(None) => {}
                Err(error) => warn!(instrument = %instrument, %error, "Position snapshot failed"),
            }
        }
        value
    }

    /// Cash captured by [`Broker::start`].
    #[must_use]
    pub const fn starting_cash(&self) -> Decimal {
        self.starting_cash
    }

    /// Value captured by [`Broker::start`].
    #[must_use]
    pub const fn starting_value(&self) -> Decimal {
        self.starting_value
    }

    async fn ensure_ledger(&mut self, portfolio: Option<&PortfolioId>) -> Vec<LedgerKey> {
        let pairs = self.settings.pairs(portfolio);
        for (portfolio, exchange) in pairs.iter().cloned() {
            if !self.subscriptions.is_subscribed(&portfolio, &exchange)
                && let Err(error) = self.subscriptions.subscribe(&portfolio, &exchange).await
            {
                warn!(%portfolio, %exchange, %error, "Subscription failed");
            }
            if self.ledger.contains(&portfolio, &exchange) {
                continue;
            }
            match self.exchange.money(&portfolio, &exchange).await {
                Ok(money) => {
                    debug!(%portfolio, %exchange, cash = %money.cash, equity = %money.portfolio, "Ledger seeded");
                    self.ledger.record(
                        portfolio,
                        exchange,
                        CashValue::from_equity(money.portfolio, money.cash),
                    );
                }
                Err(error) => warn!(%portfolio, %exchange, %error, "Money snapshot failed"),
            }
        }
        pairs
    }

    /// Overwrite positions from snapshots of every configured pair.
    pub(super) async fn seed_positions(&mut self) {
        for (portfolio, exchange) in self.settings.pairs(None) {
            let snapshots = match self.exchange.positions(&portfolio, &exchange).await {
                Ok(snapshots) => snapshots,
                Err(error) => {
                    warn!(%portfolio, %exchange, %error, "Positions snapshot failed");
                    continue;
                }
            };
            for snapshot in snapshots.into_iter().filter(|s| !s.is_currency) {
                let instrument = InstrumentId::new(snapshot.exchange.clone(), snapshot.symbol.clone());
                let Some(info) = self.catalog.lookup(&instrument).await else {
                    continue;
                };
                let position = position_from_snapshot(&snapshot, info.lot_size);
                debug!(instrument = %instrument, size = %position.size, price = %position.price, "Position seeded");
                self.positions.overwrite(instrument, position);
            }
        }
    }
}
