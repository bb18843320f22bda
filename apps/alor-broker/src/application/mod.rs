//! Application Layer
//!
//! Ports to the exchange client, stateful services, and the broker that
//! ties them together for the strategy layer.
//!
//! - [`ports`]: Exchange client interface and push events
//! - [`services`]: Catalog, subscriptions, ledgers, notification queue
//! - [`broker`]: Order routing, validation and reconciliation

pub mod broker;
pub mod ports;
pub mod services;
