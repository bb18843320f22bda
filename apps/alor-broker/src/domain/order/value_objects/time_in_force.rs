//! Time in force policies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How long an order stays working on the exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    /// Until the end of the trading day.
    #[default]
    OneDay,
    /// Fill what is possible immediately, cancel the rest.
    ImmediateOrCancel,
    /// Fill completely and immediately or cancel.
    FillOrKill,
    /// Until canceled.
    GoodTillCancelled,
}

impl TimeInForce {
    /// Wire value expected by the exchange.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneDay => "oneday",
            Self::ImmediateOrCancel => "immediateorcancel",
            Self::FillOrKill => "fillorkill",
            Self::GoodTillCancelled => "goodtillcancelled",
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_one_day() {
        assert_eq!(TimeInForce::default(), TimeInForce::OneDay);
    }

    #[test]
    fn serde_uses_wire_values() {
        let json = serde_json::to_string(&TimeInForce::GoodTillCancelled).unwrap();
        assert_eq!(json, "\"goodtillcancelled\"");
        let parsed: TimeInForce = serde_json::from_str("\"fillorkill\"").unwrap();
        assert_eq!(parsed, TimeInForce::FillOrKill);
    }
}
