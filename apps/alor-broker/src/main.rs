//! Alor Broker Binary
//!
//! Runs the broker against the in-memory paper exchange.
//!
//! # Usage
//!
//! ```bash
//! ALOR_BROKER_CONFIG=config.yaml cargo run --bin alor-broker
//! ```
//!
//! # Environment Variables
//!
//! - `ALOR_BROKER_CONFIG`: Path to the YAML settings (default: `config.yaml`)
//! - `RUST_LOG`: Log filter (default: `observability.logging.level`)
//! - `OTEL_ENABLED`: Set to `false` to disable span export

use std::net::SocketAddr;
use std::time::Duration;

use alor_broker::config::{Settings, load_config};
use alor_broker::observability::{MetricsConfig, init_metrics};
use alor_broker::telemetry::init_telemetry;
use alor_broker::{Container, PaperExchange};
use anyhow::Context;
use tokio::signal;

/// Default settings file.
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let path = std::env::var("ALOR_BROKER_CONFIG").ok();
    let settings = load_settings(path.as_deref())?;
    let _telemetry = init_telemetry(&settings.observability.logging.level);

    tracing::info!(
        boards = settings.broker.boards.len(),
        accounts = settings.broker.accounts.len(),
        instruments = settings.paper.instruments.len(),
        "Starting Alor broker (paper)"
    );

    run(&settings).await.context("paper session failed")?;

    tracing::info!("Alor broker stopped");
    Ok(())
}

/// Wire the broker and drive ticks until a shutdown signal arrives.
async fn run(settings: &Settings) -> alor_broker::Result<()> {
    let metrics = &settings.observability.metrics;
    if metrics.enabled
        && let Ok(addr) = metrics.listen_addr.parse::<SocketAddr>()
    {
        init_metrics(&MetricsConfig::with_addr(addr))?;
    }

    let mut container: Container<PaperExchange> = Container::paper(settings);
    let mut broker = container.build_broker()?;
    broker.start().await;

    let mut ticks = tokio::time::interval(Duration::from_millis(settings.paper.tick_interval_ms));
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                broker.next().await;
                for order in broker.drain_notifications() {
                    tracing::info!(
                        order_ref = %order.reference(),
                        status = %order.status(),
                        instrument = %order.instrument(),
                        size = %order.size(),
                        "Order notification"
                    );
                }
            }
            () = &mut shutdown => break,
        }
    }

    broker.stop().await;
    Ok(())
}

/// Load settings, falling back to defaults when the default file is absent.
fn load_settings(path: Option<&str>) -> anyhow::Result<Settings> {
    match path {
        Some(path) => load_config(Some(path)).with_context(|| format!("loading {path}")),
        None if std::path::Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_config(Some(DEFAULT_CONFIG_PATH)).context("loading config.yaml")
        }
        None => Ok(Settings::default()),
    }
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
///
/// # Panics
///
/// Panics if signal handlers cannot be installed.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
