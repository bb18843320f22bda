//! Subscription Manager
//!
//! Lazily registers the four managed push streams for a (portfolio,
//! exchange) pair. The exchange client's live table is the only record:
//! nothing is cached here.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::ports::{ExchangeError, ExchangePort, StreamKind};
use crate::domain::shared::{Exchange, PortfolioId};

/// Manages positions/trades/orders/stop-orders subscriptions.
pub struct SubscriptionManager<E: ExchangePort> {
    exchange: Arc<E>,
}

impl<E: ExchangePort> SubscriptionManager<E> {
    /// Create a manager backed by `exchange`.
    pub const fn new(exchange: Arc<E>) -> Self {
        Self { exchange }
    }

    /// Returns true if the pair has any managed stream registered.
    pub fn is_subscribed(&self, portfolio: &PortfolioId, exchange: &Exchange) -> bool {
        self.exchange.subscriptions().iter().any(|subscription| {
            subscription.kind.is_managed()
                && &subscription.portfolio == portfolio
                && &subscription.exchange == exchange
        })
    }

    /// Register every managed stream the pair does not have yet.
    ///
    /// Returns the number of streams registered by this call.
    ///
    /// # Errors
    ///
    /// Returns the first registration error; streams registered before it
    /// stay registered.
    pub async fn subscribe(
        &self,
        portfolio: &PortfolioId,
        exchange: &Exchange,
    ) -> Result<usize, ExchangeError> {
        let live = self.exchange.subscriptions();
        let mut created = 0;
        for kind in StreamKind::MANAGED {
            let present = live.iter().any(|subscription| {
                subscription.kind == kind
                    && &subscription.portfolio == portfolio
                    && &subscription.exchange == exchange
            });
            if present {
                continue;
            }
            let id = self.exchange.subscribe(kind, portfolio, exchange).await?;
            debug!(%portfolio, %exchange, %kind, subscription = %id, "Subscribed");
            created += 1;
        }
        if created > 0 {
            info!(%portfolio, %exchange, streams = created, "Push streams registered");
        }
        Ok(created)
    }

    /// Drop every managed stream, leaving bar streams alone.
    ///
    /// Failures are logged and skipped. Returns the number removed.
    pub async fn unsubscribe_all(&self) -> usize {
        let mut removed = 0;
        for subscription in self.exchange.subscriptions() {
            if !subscription.kind.is_managed() {
                continue;
            }
            match self.exchange.unsubscribe(&subscription.id).await {
                Ok(()) => removed += 1,
                Err(error) => warn!(
                    subscription = %subscription.id,
                    kind = %subscription.kind,
                    %error,
                    "Unsubscribe failed"
                ),
            }
        }
        info!(removed, "Push streams unsubscribed");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockExchangePort, Subscription};
    use crate::domain::shared::SubscriptionId;
    use parking_lot::Mutex;

    fn subscription(kind: StreamKind, portfolio: &str) -> Subscription {
        Subscription {
            id: SubscriptionId::generate(),
            kind,
            portfolio: PortfolioId::new(portfolio),
            exchange: Exchange::new("MOEX"),
        }
    }

    /// Mock whose subscription table grows with every `subscribe` call.
    fn stateful_exchange(initial: Vec<Subscription>) -> MockExchangePort {
        let table = Arc::new(Mutex::new(initial));
        let mut exchange = MockExchangePort::new();
        let reader = Arc::clone(&table);
        exchange
            .expect_subscriptions()
            .returning(move || reader.lock().clone());
        let writer = Arc::clone(&table);
        exchange
            .expect_subscribe()
            .returning(move |kind, portfolio, exchange| {
                let id = SubscriptionId::generate();
                writer.lock().push(Subscription {
                    id: id.clone(),
                    kind,
                    portfolio: portfolio.clone(),
                    exchange: exchange.clone(),
                });
                Ok(id)
            });
        let remover = Arc::clone(&table);
        exchange.expect_unsubscribe().returning(move |id| {
            remover.lock().retain(|subscription| &subscription.id != id);
            Ok(())
        });
        exchange
    }

    #[tokio::test]
    async fn subscribe_is_idempotent() {
        let exchange = Arc::new(stateful_exchange(Vec::new()));
        let manager = SubscriptionManager::new(Arc::clone(&exchange));
        let portfolio = PortfolioId::new("D12345");
        let moex = Exchange::new("MOEX");

        assert!(!manager.is_subscribed(&portfolio, &moex));
        assert_eq!(manager.subscribe(&portfolio, &moex).await.unwrap(), 4);
        assert_eq!(manager.subscribe(&portfolio, &moex).await.unwrap(), 0);
        assert!(manager.is_subscribed(&portfolio, &moex));
        assert_eq!(exchange.subscriptions().len(), 4);
    }

    #[tokio::test]
    async fn subscribe_fills_in_missing_streams_only() {
        let exchange = Arc::new(stateful_exchange(vec![
            subscription(StreamKind::Positions, "D12345"),
            subscription(StreamKind::Trades, "D12345"),
        ]));
        let manager = SubscriptionManager::new(Arc::clone(&exchange));

        let created = manager
            .subscribe(&PortfolioId::new("D12345"), &Exchange::new("MOEX"))
            .await
            .unwrap();

        assert_eq!(created, 2);
    }

    #[tokio::test]
    async fn bar_streams_do_not_count_and_survive_unsubscribe_all() {
        let exchange = Arc::new(stateful_exchange(vec![subscription(
            StreamKind::Bars,
            "D12345",
        )]));
        let manager = SubscriptionManager::new(Arc::clone(&exchange));
        let portfolio = PortfolioId::new("D12345");
        let moex = Exchange::new("MOEX");

        assert!(!manager.is_subscribed(&portfolio, &moex));
        manager.subscribe(&portfolio, &moex).await.unwrap();
        assert_eq!(manager.unsubscribe_all().await, 4);

        let left = exchange.subscriptions();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].kind, StreamKind::Bars);
    }

    #[tokio::test]
    async fn subscribe_propagates_errors() {
        let mut exchange = MockExchangePort::new();
        exchange.expect_subscriptions().returning(Vec::new);
        exchange
            .expect_subscribe()
            .returning(|_, _, _| Err(ExchangeError::transport("socket closed")));
        let manager = SubscriptionManager::new(Arc::new(exchange));

        let result = manager
            .subscribe(&PortfolioId::new("D12345"), &Exchange::new("MOEX"))
            .await;

        assert!(matches!(result, Err(ExchangeError::Transport { .. })));
    }
}
