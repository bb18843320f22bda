//! Crate-level error.
//!
//! Wraps the per-layer errors for callers that drive the broker end to end.
//! Rejections of individual orders are never errors; they surface as order
//! status and notifications.

use thiserror::Error;

use crate::application::ports::ExchangeError;
use crate::config::ConfigError;
use crate::domain::linking::BracketError;
use crate::domain::order::OrderError;
use crate::infrastructure::ContainerError;
use crate::observability::MetricsError;

/// Any error the broker crate can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Wiring failed.
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// Exchange call failed.
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    /// Order state change was refused.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Bracket request was incoherent.
    #[error(transparent)]
    Bracket(#[from] BracketError),

    /// Metrics exporter could not start.
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// Result alias over [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
