//! Strongly-typed identifiers for domain entities.
//!
//! These prevent mixing up portfolio codes with account codes, or a local
//! order reference with the number the exchange assigned.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(OrderNumber, "Exchange-assigned order number.");
define_id!(PortfolioId, "Client portfolio code (e.g. `D12345`).");
define_id!(AccountId, "Trading account code bound to a portfolio.");
define_id!(ServerCode, "Trading server code used for stop orders.");
define_id!(Exchange, "Exchange code (`MOEX`, `SPBX`).");
define_id!(Board, "Trading board/segment code (`TQBR`, `TQOB`, `RFUD`).");
define_id!(Symbol, "Exchange ticker symbol.");
define_id!(StrategyId, "Owning strategy reference.");
define_id!(SubscriptionId, "Opaque push-channel subscription identifier.");

impl SubscriptionId {
    /// Generate a fresh identifier using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Process-local order reference.
///
/// Assigned by the broker at creation, strictly increasing for the lifetime
/// of the broker, so ordering by reference is ordering by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderRef(u64);

impl OrderRef {
    /// Wrap a raw reference value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The reference following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for OrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
