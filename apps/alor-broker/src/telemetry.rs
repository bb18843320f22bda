//! Tracing Setup
//!
//! Console logging through `tracing-subscriber`, with spans optionally
//! exported over OTLP.
//!
//! # Environment
//!
//! - `RUST_LOG`: filter directives (default: the configured log level)
//! - `OTEL_ENABLED`: `false` keeps logging on the console only
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP gRPC endpoint (default: `http://localhost:4317`)
//! - `OTEL_SERVICE_NAME`: service name for traces (default: `alor-broker`)
//! - `APP_ENV`: `development` enables colored output without targets

use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_ENDPOINT: &str = "http://localhost:4317";
const DEFAULT_SERVICE: &str = "alor-broker";

/// Telemetry options resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryOptions {
    /// Export spans over OTLP.
    pub export: bool,
    /// OTLP gRPC endpoint.
    pub endpoint: String,
    /// Service name attached to exported spans.
    pub service_name: String,
    /// Colored console output without targets.
    pub development: bool,
}

impl TelemetryOptions {
    /// Read options from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            export: lookup("OTEL_ENABLED").is_none_or(|v| v != "false"),
            endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            service_name: lookup("OTEL_SERVICE_NAME")
                .unwrap_or_else(|| DEFAULT_SERVICE.to_string()),
            development: lookup("APP_ENV").is_some_and(|v| v == "development"),
        }
    }
}

/// Shuts the tracer provider down on drop.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    /// Returns true if spans are exported over OTLP.
    #[must_use]
    pub const fn is_exporting(&self) -> bool {
        self.provider.is_some()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("Error shutting down tracer provider: {e:?}");
        }
    }
}

/// Install the global subscriber.
///
/// `default_level` applies when `RUST_LOG` is unset. Falls back to console
/// logging when the OTLP exporter cannot be built.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
#[must_use]
pub fn init_telemetry(default_level: &str) -> TelemetryGuard {
    let options = TelemetryOptions::from_env();
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if !options.export {
        init_console(env_filter, options.development);
        tracing::info!("Span export disabled, logging to console only");
        return TelemetryGuard { provider: None };
    }

    let exporter = match opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&options.endpoint)
        .build()
    {
        Ok(exporter) => exporter,
        Err(e) => {
            eprintln!("Failed to create OTLP exporter: {e:?}, falling back to console logging");
            init_console(env_filter, options.development);
            return TelemetryGuard { provider: None };
        }
    };

    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(exporter)
        .build();
    let otel_layer =
        tracing_opentelemetry::layer().with_tracer(provider.tracer(options.service_name.clone()));

    Registry::default()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(!options.development)
                .with_ansi(options.development),
        )
        .with(otel_layer)
        .init();

    tracing::info!(
        service_name = %options.service_name,
        endpoint = %options.endpoint,
        "Span export initialized"
    );

    TelemetryGuard {
        provider: Some(provider),
    }
}

fn init_console(env_filter: EnvFilter, development: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(!development)
        .with_ansi(development)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn options(pairs: &[(&str, &str)]) -> TelemetryOptions {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        TelemetryOptions::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_export_to_local_collector() {
        let options = options(&[]);
        assert!(options.export);
        assert!(!options.development);
        assert_eq!(options.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(options.service_name, "alor-broker");
    }

    #[test]
    fn environment_overrides() {
        let options = options(&[
            ("OTEL_ENABLED", "false"),
            ("OTEL_SERVICE_NAME", "paper-session"),
            ("APP_ENV", "development"),
        ]);
        assert!(!options.export);
        assert!(options.development);
        assert_eq!(options.service_name, "paper-session");
    }
}
