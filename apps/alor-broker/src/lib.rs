// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Alor Broker - Rust Core Library
//!
//! Order lifecycle and reconciliation engine between a bar-driven strategy
//! and the Alor trading API.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Pure types and services
//!   - `order`: Order aggregate, status lifecycle, fills
//!   - `linking`: OCO pairs, bracket chains, reconciliation decisions
//!   - `instrument`: Symbol metadata, price translation
//!   - `position`: Position merge, cash/value pairs
//!
//! - **Application**: Ports and orchestration
//!   - `ports`: `ExchangePort` and push events
//!   - `services`: Catalog, subscriptions, ledgers, notification queue
//!   - `broker`: The strategy-facing `Broker`
//!
//! - **Infrastructure**: Adapters
//!   - `container`: Dependency injection container
//!   - `paper`: In-memory exchange

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Ports, services and the broker.
pub mod application;

/// Infrastructure layer - Adapters and wiring.
pub mod infrastructure;

// =============================================================================
// Ambient Modules
// =============================================================================

/// YAML configuration.
pub mod config;

/// Crate-level error.
pub mod error;

/// Prometheus metrics.
pub mod observability;

/// Tracing setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::instrument::{PriceTranslator, SymbolInfo};
pub use domain::linking::{BracketError, BracketRequest, LinkAction, LinkedOrders};
pub use domain::order::{
    ExecType, Order, OrderError, OrderKind, OrderRequest, OrderSide, OrderStatus, RejectReason,
    TimeInForce,
};
pub use domain::position::{CashValue, Position};
pub use domain::shared::{
    AccountId, Board, Exchange, InstrumentId, OrderNumber, OrderRef, PortfolioId, ServerCode,
    StrategyId, Symbol,
};

// Application re-exports
pub use application::broker::{BoardBinding, Broker, BrokerSettings, CancelOutcome};
pub use application::ports::{ExchangeError, ExchangePort, PushEvent, push_channel};
pub use application::services::Notification;

// Infrastructure re-exports
pub use infrastructure::{Container, ContainerError, PaperExchange};

pub use error::{Error, Result};
