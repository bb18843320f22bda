//! Configuration module for the broker.
//!
//! Loads YAML settings with environment variable interpolation and checks
//! that the routing tables are consistent before anything is wired.
//!
//! # Usage
//!
//! ```rust,ignore
//! use alor_broker::config::load_config;
//!
//! let settings = load_config(Some("config.yaml"))?;
//! let broker_settings = alor_broker::BrokerSettings::from(&settings.broker);
//! ```

mod broker;
mod observability;
mod paper;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use broker::BrokerConfig;
pub use observability::{LoggingConfig, MetricsSettings, ObservabilityConfig};
pub use paper::{PaperConfig, PaperPortfolio};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Broker routing tables.
    #[serde(default)]
    pub broker: BrokerConfig,
    /// Logging and metrics.
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// Paper session.
    #[serde(default)]
    pub paper: PaperConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// `path` defaults to `config.yaml`.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Settings, ConfigError> {
    let path = path.unwrap_or("config.yaml");
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;
    load_config_from_string(&contents)
}

/// Load configuration from a YAML string.
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Settings, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let settings: Settings = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&settings)?;
    Ok(settings)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map(|m| m.as_str());
        match cap.get(1).map(|m| std::env::var(m.as_str())) {
            Some(Ok(v)) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(settings: &Settings) -> Result<(), ConfigError> {
    let broker = &settings.broker;

    for (board, binding) in &broker.boards {
        if binding.portfolio.as_str().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "broker.boards.{board} has an empty portfolio"
            )));
        }
        if !broker.accounts.is_empty() && !broker.accounts.contains_key(&binding.portfolio) {
            return Err(ConfigError::ValidationError(format!(
                "broker.boards.{board} references portfolio {} missing from broker.accounts",
                binding.portfolio
            )));
        }
    }

    if let Some((portfolio, _)) = broker
        .accounts
        .iter()
        .find(|(_, exchanges)| exchanges.is_empty())
    {
        return Err(ConfigError::ValidationError(format!(
            "broker.accounts.{portfolio} lists no exchanges"
        )));
    }

    for info in &settings.paper.instruments {
        if info.lot_size <= Decimal::ZERO || info.min_step <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "paper instrument {}.{} needs a positive lot_size and min_step",
                info.exchange, info.symbol
            )));
        }
    }

    if settings.paper.tick_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "paper.tick_interval_ms must be positive".to_string(),
        ));
    }

    let metrics = &settings.observability.metrics;
    if metrics.enabled && metrics.listen_addr.parse::<std::net::SocketAddr>().is_err() {
        return Err(ConfigError::ValidationError(format!(
            "observability.metrics.listen_addr '{}' is not a socket address",
            metrics.listen_addr
        )));
    }

    Ok(())
}
