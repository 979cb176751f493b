//! Provider failover daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                 FAILOVER SERVICE                  │
//!                    │                                                   │
//!  execute(user, op) │  ┌──────────┐   ┌──────────┐   ┌──────────────┐  │
//!  ──────────────────┼─▶│ selection│──▶│ failover │──▶│   callback   │──┼──▶ Provider
//!                    │  │  + breaker│   │ executor │   │ (per attempt)│  │
//!                    │  └────▲─────┘   └────┬─────┘   └──────────────┘  │
//!                    │       │              │ outcomes                   │
//!                    │  ┌────┴─────┐   ┌────▼─────┐   ┌──────────────┐  │
//!                    │  │  health  │◀──│  events  │   │   fallback   │  │
//!                    │  │ registry │   │ + store  │   │  generator   │  │
//!                    │  └────▲─────┘   └──────────┘   └──────────────┘  │
//!                    │       │ probes                                     │
//!                    │  ┌────┴─────┐        ┌──────────────────────────┐  │
//!                    │  │  health  │        │ admin API · config reload │  │
//!                    │  │ monitor  │        │ metrics · lifecycle       │  │
//!                    │  └──────────┘        └──────────────────────────┘  │
//!                    └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;

use provider_failover::admin::{admin_router, AdminState};
use provider_failover::config::watcher::ConfigWatcher;
use provider_failover::config::{load_config, AppConfig};
use provider_failover::lifecycle::{build_runtime, Shutdown, Signal, SignalListener};
use provider_failover::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "provider-failover")]
#[command(about = "Provider health monitoring and failover daemon", long_about = None)]
struct Args {
    /// Path to the TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "provider-failover starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let runtime = build_runtime(&config)?;
    let service = runtime.service.clone();

    if service.start_health_monitoring() {
        tracing::info!(interval_secs = config.health_check.interval_secs, "Health monitoring started");
    }

    let shutdown = Shutdown::new();

    let admin_task = if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        tracing::info!(address = %listener.local_addr()?, "Admin API listening");
        let router = admin_router(
            AdminState::new(service.clone(), &config.admin),
            Duration::from_secs(config.admin.request_timeout_secs),
        );
        let stop = shutdown.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).with_graceful_shutdown(stop.wait()).await {
                tracing::error!(error = %e, "Admin API server failed");
            }
        }))
    } else {
        None
    };

    // Keep the watcher alive for the life of the process.
    let (mut reloads, _watcher) = match &args.config {
        Some(path) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(handle) => (Some(rx), Some(handle)),
                Err(e) => {
                    tracing::warn!(error = %e, "Config hot reload unavailable");
                    (None, None)
                }
            }
        }
        None => (None, None),
    };

    let mut signals = SignalListener::new();
    loop {
        tokio::select! {
            signal = signals.recv() => match signal {
                Signal::Shutdown => break,
                Signal::Reload => {
                    let Some(path) = &args.config else {
                        tracing::info!("No config file to reload");
                        continue;
                    };
                    match load_config(path) {
                        Ok(new_config) => service.apply_config(&new_config).await,
                        Err(e) => tracing::error!(error = %e, "Reload failed, keeping current configuration"),
                    }
                }
            },
            Some(new_config) = next_reload(&mut reloads) => {
                service.apply_config(&new_config).await;
            }
        }
    }

    tracing::info!("Shutting down");
    shutdown.trigger();
    service.stop_health_monitoring().await;
    if let Some(task) = admin_task {
        let _ = task.await;
    }
    if let Err(e) = runtime.store.save_to_file() {
        tracing::error!(error = %e, "Failed to persist operation records");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn next_reload(rx: &mut Option<tokio::sync::mpsc::UnboundedReceiver<AppConfig>>) -> Option<AppConfig> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
