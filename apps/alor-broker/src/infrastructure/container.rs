//! Dependency Injection Container
//!
//! Holds the exchange adapter, the routing tables, and the consumer half of
//! the push channel, and wires them into a [`Broker`].

use std::sync::Arc;

use thiserror::Error;

use super::paper::PaperExchange;
use crate::application::broker::{Broker, BrokerSettings};
use crate::application::ports::{ExchangePort, Money, PushReceiver, push_channel};
use crate::config::Settings;

/// Container errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    /// The push receiver was already handed to a broker.
    #[error("Push receiver already taken; only one broker can be built per container")]
    PushReceiverTaken,
}

/// Dependency injection container.
pub struct Container<E>
where
    E: ExchangePort + 'static,
{
    exchange: Arc<E>,
    settings: BrokerSettings,
    push: Option<PushReceiver>,
}

impl<E> Container<E>
where
    E: ExchangePort + 'static,
{
    /// Create a new container.
    ///
    /// `push` must be the receiver paired with the sender `exchange` reports on.
    pub fn new(exchange: Arc<E>, settings: BrokerSettings, push: PushReceiver) -> Self {
        Self {
            exchange,
            settings,
            push: Some(push),
        }
    }

    /// Get the exchange port.
    pub fn exchange(&self) -> Arc<E> {
        Arc::clone(&self.exchange)
    }

    /// Get the routing tables.
    pub const fn settings(&self) -> &BrokerSettings {
        &self.settings
    }

    /// Create the `Broker`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::PushReceiverTaken`] on a second call.
    pub fn build_broker(&mut self) -> Result<Broker<E>, ContainerError> {
        let push = self.push.take().ok_or(ContainerError::PushReceiverTaken)?;
        Ok(Broker::new(
            Arc::clone(&self.exchange),
            self.settings.clone(),
            push,
        ))
    }
}

impl Container<PaperExchange> {
    /// Container around a [`PaperExchange`] seeded from the `paper` section.
    pub fn paper(settings: &Settings) -> Self {
        let (tx, rx) = push_channel();
        let exchange = settings.paper.instruments.iter().cloned().fold(
            PaperExchange::new(tx),
            PaperExchange::with_instrument,
        );
        let exchange = settings.paper.portfolios.iter().fold(exchange, |exchange, entry| {
            exchange
                .with_portfolio(entry.portfolio.clone(), entry.account.clone())
                .with_money(
                    entry.portfolio.clone(),
                    entry.exchange.clone(),
                    Money {
                        portfolio: entry.cash,
                        cash: entry.cash,
                    },
                )
        });
        Self::new(
            Arc::new(exchange),
            BrokerSettings::from(&settings.broker),
            rx,
        )
    }
}
