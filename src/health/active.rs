//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every known provider, independent of user traffic
//! - Update provider health state based on results
//! - Start/stop lifecycle with a single running task
//!
//! # Design Decisions
//! - Each probe runs in its own task under its own timeout, so a hanging or
//!   panicking check cannot stall or abort the others
//! - Results are applied only after every probe of a round has finished
//! - Shutdown is observed between rounds; stop awaits the in-flight round

use arc_swap::ArcSwap;
use futures_util::future::join_all;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::config::HealthCheckConfig;
use crate::health::registry::HealthRegistry;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::provider::{ConnectivityCheck, ProviderId};
use crate::resilience::{run_attempt, AttemptFailure, FailoverReason};

struct Prober {
    registry: Arc<HealthRegistry>,
    checker: Arc<dyn ConnectivityCheck>,
    config: ArcSwap<HealthCheckConfig>,
}

struct RunningMonitor {
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

/// Background probe loop with an explicit start/stop lifecycle.
pub struct HealthMonitor {
    prober: Arc<Prober>,
    running: Mutex<Option<RunningMonitor>>,
}

impl HealthMonitor {
    pub fn new(registry: Arc<HealthRegistry>, checker: Arc<dyn ConnectivityCheck>, config: HealthCheckConfig) -> Self {
        Self {
            prober: Arc::new(Prober {
                registry,
                checker,
                config: ArcSwap::from_pointee(config),
            }),
            running: Mutex::new(None),
        }
    }

    /// Replace probe settings; a running loop picks them up on restart.
    pub fn set_config(&self, config: HealthCheckConfig) {
        self.prober.config.store(Arc::new(config));
    }

    pub fn config(&self) -> HealthCheckConfig {
        self.prober.config.load().as_ref().clone()
    }

    /// Spawn the probe loop. Returns false if already running or disabled.
    pub fn start(&self) -> bool {
        let config = self.prober.config.load_full();
        if !config.enabled {
            tracing::info!("Active health checks disabled");
            return false;
        }

        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            tracing::debug!("Health monitor already running");
            return false;
        }

        let shutdown = Shutdown::new();
        let handle = tokio::spawn(run(self.prober.clone(), config.interval(), shutdown.subscribe()));
        *running = Some(RunningMonitor { shutdown, handle });
        true
    }

    /// Signal the loop to exit and wait for the in-flight round. Idempotent.
    pub async fn stop(&self) {
        let running = self.running.lock().unwrap_or_else(|e| e.into_inner()).take();
        let Some(RunningMonitor { shutdown, handle }) = running else {
            return;
        };

        shutdown.trigger();
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Health monitor task ended abnormally");
        }
        tracing::info!("Health monitor stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    /// Run one probe round immediately, outside the loop.
    pub async fn probe_once(&self) {
        self.prober.check_all().await;
    }
}

async fn run(prober: Arc<Prober>, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
    tracing::info!(interval_secs = interval.as_secs(), "Health monitor starting");

    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.recv() => {
                tracing::info!("Health monitor received shutdown signal, exiting loop");
                break;
            }
            _ = ticker.tick() => {
                prober.check_all().await;
            }
        }
    }
}

type ProbeResult = (Result<String, AttemptFailure>, Duration);

impl Prober {
    async fn check_all(&self) {
        let config = self.config.load_full();
        let providers: Vec<ProviderId> = self.registry.providers().to_vec();

        let handles: Vec<JoinHandle<ProbeResult>> = providers
            .iter()
            .map(|provider| {
                let checker = self.checker.clone();
                let provider = provider.clone();
                let test_user = config.test_user_id.clone();
                let deadline = config.timeout();
                tokio::spawn(async move {
                    let started = Instant::now();
                    let result = run_attempt(deadline, async {
                        let report = checker.check(&provider, &test_user).await;
                        if report.healthy {
                            Ok(report.message)
                        } else {
                            Err(report.message)
                        }
                    })
                    .await;
                    (result, started.elapsed())
                })
            })
            .collect();

        let results = join_all(handles).await;

        for (provider, joined) in providers.iter().zip(results) {
            let outcome = match joined {
                Ok((Ok(message), elapsed)) => {
                    let latency_ms = elapsed.as_millis() as u64;
                    tracing::debug!(provider = %provider, latency_ms, message = %message, "Health check passed");
                    self.registry.record_success(provider, latency_ms).map(|_| true)
                }
                Ok((Err(failure), _)) => {
                    tracing::warn!(
                        provider = %provider,
                        reason = %FailoverReason::HealthCheckFailed,
                        error = %failure.message(),
                        "Health check failed"
                    );
                    let message = format!("{}: {}", FailoverReason::HealthCheckFailed, failure.message());
                    self.registry.record_failure(provider, &message).map(|_| false)
                }
                Err(e) => {
                    tracing::error!(provider = %provider, error = %e, "Health check task panicked");
                    let message = format!("{}: check aborted ({})", FailoverReason::HealthCheckFailed, e);
                    self.registry.record_failure(provider, &message).map(|_| false)
                }
            };

            match outcome {
                Ok(healthy) => metrics::record_health_check(provider, healthy),
                Err(e) => tracing::warn!(provider = %provider, error = %e, "Could not record health check"),
            }
        }
    }
}
