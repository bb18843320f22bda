//! Observability
//!
//! Prometheus metrics for order routing and push-event handling.

pub mod metrics;

pub use metrics::{MetricsConfig, MetricsError, init_metrics};
