//! Prometheus metrics for the broker.
//!
//! Every recorder is a no-op until [`init_metrics`] installs the exporter,
//! so library code records unconditionally.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
    /// Histogram buckets for latency measurements (in seconds).
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9090)),
            // Latency buckets from 1ms to 5s
            latency_buckets: vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            listen_addr: addr,
            ..Default::default()
        }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// This starts an HTTP server that exposes metrics at `/metrics`.
///
/// # Errors
///
/// Returns an error if the metrics exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .set_buckets(&config.latency_buckets)
        .map_err(|e| MetricsError::Configuration(e.to_string()))?
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to configure metrics exporter.
    #[error("metrics configuration error: {0}")]
    Configuration(String),
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Order Routing Metrics
// ============================================================================

/// Record an order sent to the exchange.
///
/// # Arguments
///
/// * `order_type` - Order kind (`market`, `limit`, `stop`, `stop_limit`)
/// * `latency_seconds` - Duration of the creation call
pub fn record_order_submission(order_type: &str, latency_seconds: f64) {
    counter!(
        "broker_orders_submitted_total",
        "order_type" => order_type.to_string()
    )
    .increment(1);

    histogram!(
        "broker_order_submit_latency_seconds",
        "order_type" => order_type.to_string()
    )
    .record(latency_seconds);
}

/// Record an order rejection.
///
/// # Arguments
///
/// * `reason` - Rejection code (e.g. `PORTFOLIO_NOT_FOUND`, `EXCHANGE_ERROR`)
pub fn record_order_rejection(reason: &str) {
    counter!(
        "broker_orders_rejected_total",
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record a confirmed or local cancellation.
pub fn record_order_cancel() {
    counter!("broker_orders_canceled_total").increment(1);
}

/// Record a fill.
pub fn record_fill(side: &str) {
    counter!("broker_fills_total", "side" => side.to_string()).increment(1);
}

/// Update the live orders gauge.
pub fn update_live_orders(count: usize) {
    #[allow(clippy::cast_precision_loss)]
    gauge!("broker_live_orders").set(count as f64);
}

// ============================================================================
// Push Channel Metrics
// ============================================================================

/// Record a push event taken off the channel.
pub fn record_push_event(kind: &str) {
    counter!("broker_push_events_total", "kind" => kind.to_string()).increment(1);
}

/// Record an action produced by linked-order reconciliation.
pub fn record_linked_action(action: &str) {
    counter!("broker_linked_actions_total", "action" => action.to_string()).increment(1);
}
