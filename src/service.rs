//! Public entry point wiring the failover core together.
//!
//! # Data Flow
//! ```text
//! AppConfig + Collaborators
//!     → HealthRegistry (one entry per provider, priority order)
//!     → ProviderSelector → FailoverExecutor
//!     → HealthMonitor (background probes into the same registry)
//!
//! execute_with_failover → FailoverExecutor::execute
//! provider_status       → registry + breaker views + event log snapshot
//! apply_config          → swap settings, resize event log, re-check
//!                         thresholds, restart a running monitor
//! ```

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tokio::time::Instant;

use crate::config::{shared_settings, AppConfig, FailoverSettings, HealthCheckConfig, SharedSettings};
use crate::events::{FailoverEvent, FailoverEventLog, OperationStore};
use crate::failover::{DefaultFallbackGenerator, ExecutionOutcome, FailoverError, FailoverExecutor, FallbackGenerator};
use crate::health::{HealthError, HealthMonitor, HealthRegistry, ProviderHealthView, ProviderStatus};
use crate::provider::{ConnectivityCheck, CredentialStore, OperationType, ProviderId};
use crate::selection::ProviderSelector;

/// External capabilities the core consumes.
#[derive(Clone)]
pub struct Collaborators {
    pub credentials: Arc<dyn CredentialStore>,
    pub connectivity: Arc<dyn ConnectivityCheck>,
    pub operations: Arc<dyn OperationStore>,
    pub fallback: Arc<dyn FallbackGenerator>,
}

impl Collaborators {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        connectivity: Arc<dyn ConnectivityCheck>,
        operations: Arc<dyn OperationStore>,
    ) -> Self {
        Self {
            credentials,
            connectivity,
            operations,
            fallback: Arc::new(DefaultFallbackGenerator),
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackGenerator>) -> Self {
        self.fallback = fallback;
        self
    }
}

/// Read-only snapshot for dashboards and alerts.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatusReport {
    pub providers: BTreeMap<ProviderId, ProviderHealthView>,
    /// Provider names in priority order.
    pub priority: Vec<ProviderId>,
    /// Oldest first.
    pub recent_failover_events: Vec<FailoverEvent>,
    pub health_monitoring_active: bool,
    pub degraded_mode_enabled: bool,
}

pub struct FailoverService {
    settings: SharedSettings,
    registry: Arc<HealthRegistry>,
    selector: Arc<ProviderSelector>,
    executor: FailoverExecutor,
    events: Arc<FailoverEventLog>,
    monitor: HealthMonitor,
}

impl FailoverService {
    pub fn new(config: &AppConfig, collaborators: Collaborators) -> Self {
        let providers = config.provider_names().into_iter().map(ProviderId::from).collect();
        Self::from_parts(providers, config.failover.clone(), config.health_check.clone(), collaborators)
    }

    /// Build from explicit parts; `providers` order is the priority order.
    pub fn from_parts(
        providers: Vec<ProviderId>,
        failover: FailoverSettings,
        health_check: HealthCheckConfig,
        collaborators: Collaborators,
    ) -> Self {
        let events = Arc::new(FailoverEventLog::new(failover.event_buffer_size));
        let settings = shared_settings(failover);
        let registry = Arc::new(HealthRegistry::new(
            providers,
            collaborators.operations.clone(),
            settings.clone(),
        ));
        let selector = Arc::new(ProviderSelector::new(
            registry.clone(),
            collaborators.credentials,
            settings.clone(),
        ));
        let executor = FailoverExecutor::new(
            selector.clone(),
            registry.clone(),
            collaborators.operations,
            events.clone(),
            collaborators.fallback,
            settings.clone(),
        );
        let monitor = HealthMonitor::new(registry.clone(), collaborators.connectivity, health_check);

        Self {
            settings,
            registry,
            selector,
            executor,
            events,
            monitor,
        }
    }

    /// Run `call` against the best available provider, failing over in order.
    pub async fn execute_with_failover<F, Fut, E>(
        &self,
        user_id: &str,
        operation: OperationType,
        call: F,
    ) -> Result<ExecutionOutcome, FailoverError>
    where
        F: Fn(ProviderId, String) -> Fut,
        Fut: Future<Output = Result<Value, E>>,
        E: Display,
    {
        self.executor.execute(user_id, operation, call).await
    }

    pub fn select_best(&self, user_id: &str, operation: &OperationType) -> Option<ProviderId> {
        self.selector.select_best(user_id, operation)
    }

    pub fn candidates(&self, user_id: &str, operation: &OperationType) -> Vec<ProviderId> {
        self.selector.candidates(user_id, operation)
    }

    pub fn provider_health(&self, provider: &ProviderId) -> Option<ProviderHealthView> {
        let breaker = self.settings.load().circuit_breaker();
        self.registry
            .get(provider)
            .map(|health| health.view(breaker.state(&health, Instant::now())))
    }

    pub fn provider_status(&self) -> ProviderStatusReport {
        let breaker = self.settings.load().circuit_breaker();
        let now = Instant::now();
        let providers = self
            .registry
            .snapshot()
            .into_iter()
            .map(|health| {
                let view = health.view(breaker.state(&health, now));
                (health.provider, view)
            })
            .collect();

        ProviderStatusReport {
            providers,
            priority: self.registry.providers().to_vec(),
            recent_failover_events: self.events.snapshot(),
            health_monitoring_active: self.monitor.is_running(),
            degraded_mode_enabled: self.degraded_mode_enabled(),
        }
    }

    /// Administrative override. Returns the previous status.
    pub fn force_provider_status(
        &self,
        provider: &ProviderId,
        status: ProviderStatus,
    ) -> Result<ProviderStatus, HealthError> {
        self.registry.force_status(provider, status)
    }

    /// Start background probing. Returns false if already running or disabled.
    pub fn start_health_monitoring(&self) -> bool {
        self.monitor.start()
    }

    pub async fn stop_health_monitoring(&self) {
        self.monitor.stop().await;
    }

    pub fn health_monitoring_active(&self) -> bool {
        self.monitor.is_running()
    }

    /// Run one probe round now, whether or not the loop is running.
    pub async fn probe_now(&self) {
        self.monitor.probe_once().await;
    }

    pub fn degraded_mode_enabled(&self) -> bool {
        self.settings.load().degraded_mode_enabled
    }

    pub fn set_degraded_mode(&self, enabled: bool) {
        self.settings.rcu(|current| {
            let mut next = FailoverSettings::clone(current);
            next.degraded_mode_enabled = enabled;
            next
        });
        tracing::warn!(enabled, "Degraded mode toggled");
    }

    pub fn settings(&self) -> Arc<FailoverSettings> {
        self.settings.load_full()
    }

    /// Retune a running service from a reloaded config.
    ///
    /// The provider set is fixed at construction; changes to it are ignored.
    pub async fn apply_config(&self, config: &AppConfig) {
        let known: Vec<String> = self.registry.providers().iter().map(|p| p.to_string()).collect();
        if known != config.provider_names() {
            tracing::warn!(
                current = ?known,
                requested = ?config.provider_names(),
                "Provider list changes require a restart; keeping current providers"
            );
        }

        let current = self.settings.load_full();
        if current.degraded_mode_enabled != config.failover.degraded_mode_enabled {
            tracing::warn!(
                from = current.degraded_mode_enabled,
                to = config.failover.degraded_mode_enabled,
                "Reload overrides runtime degraded mode setting"
            );
        }

        self.events.set_capacity(config.failover.event_buffer_size);
        self.settings.store(Arc::new(config.failover.clone()));
        self.registry.enforce_threshold();

        // Changed probe settings restart the loop only if it was running.
        if self.monitor.config() != config.health_check {
            let was_running = self.monitor.is_running();
            self.monitor.stop().await;
            self.monitor.set_config(config.health_check.clone());
            if was_running {
                self.monitor.start();
            }
        }
        tracing::info!("Configuration applied");
    }
}
