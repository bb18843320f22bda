//! Application Services
//!
//! Stateful helpers owned by the broker.

mod catalog;
mod ledger;
mod notifications;
mod positions;
mod subscriptions;

pub use catalog::InstrumentCatalog;
pub use ledger::{CashLedger, LedgerKey};
pub use notifications::{Notification, NotificationQueue};
pub use positions::PositionBook;
pub use subscriptions::SubscriptionManager;
