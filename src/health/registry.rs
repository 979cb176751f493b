//! Process-wide provider health registry.
//!
//! # Responsibilities
//! - Hold one `ProviderHealth` entry per known provider
//! - Apply success/failure outcomes from the executor and probe loop
//! - Recompute rolling success rate from the operation store
//! - Administrative status override
//!
//! # Design Decisions
//! - Entries are created once at construction and never removed
//! - Per-entry locking only (DashMap shards); concurrent writers to the same
//!   provider are last-writer-wins per field
//! - Store read failures keep the previous success rate

use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::config::SharedSettings;
use crate::events::{success_rate, OperationStore};
use crate::health::state::{ProviderHealth, ProviderStatus};
use crate::observability::metrics;
use crate::provider::ProviderId;

/// Errors raised by the health registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealthError {
    #[error("unknown provider '{0}'")]
    UnknownProvider(ProviderId),
}

pub struct HealthRegistry {
    entries: DashMap<ProviderId, ProviderHealth>,
    priority: Vec<ProviderId>,
    store: Arc<dyn OperationStore>,
    settings: SharedSettings,
}

impl HealthRegistry {
    /// Create an entry for every provider; `providers` order is the priority order.
    pub fn new(providers: Vec<ProviderId>, store: Arc<dyn OperationStore>, settings: SharedSettings) -> Self {
        let entries = DashMap::new();
        for provider in &providers {
            entries.insert(provider.clone(), ProviderHealth::new(provider.clone()));
            metrics::record_provider_status(provider, ProviderStatus::Unknown);
        }
        Self {
            entries,
            priority: providers,
            store,
            settings,
        }
    }

    /// Known providers in priority order.
    pub fn providers(&self) -> &[ProviderId] {
        &self.priority
    }

    pub fn get(&self, provider: &ProviderId) -> Option<ProviderHealth> {
        self.entries.get(provider).map(|r| r.value().clone())
    }

    /// All entries in priority order.
    pub fn snapshot(&self) -> Vec<ProviderHealth> {
        self.priority.iter().filter_map(|p| self.get(p)).collect()
    }

    fn trailing_success_rate(&self, provider: &ProviderId) -> Option<f64> {
        let window = self.settings.load().success_rate_window;
        match self.store.recent(provider, window) {
            Ok(records) => success_rate(&records),
            Err(e) => {
                tracing::warn!(provider = %provider, error = %e, "Could not read operation records for success rate");
                None
            }
        }
    }

    pub fn record_success(&self, provider: &ProviderId, latency_ms: u64) -> Result<ProviderStatus, HealthError> {
        let rate = self.trailing_success_rate(provider);
        let mut entry = self
            .entries
            .get_mut(provider)
            .ok_or_else(|| HealthError::UnknownProvider(provider.clone()))?;

        let previous = entry.apply_success(latency_ms, rate);
        if previous != ProviderStatus::Healthy {
            tracing::info!(
                provider = %provider,
                from = %previous,
                latency_ms,
                "Provider recovered to HEALTHY"
            );
            metrics::record_provider_status(provider, ProviderStatus::Healthy);
        }
        Ok(entry.status)
    }

    pub fn record_failure(&self, provider: &ProviderId, error_message: &str) -> Result<ProviderStatus, HealthError> {
        let rate = self.trailing_success_rate(provider);
        let threshold = self.settings.load().failure_threshold;
        let mut entry = self
            .entries
            .get_mut(provider)
            .ok_or_else(|| HealthError::UnknownProvider(provider.clone()))?;

        let previous = entry.apply_failure(error_message, threshold, rate);
        let current = entry.status;
        if previous != current {
            if current == ProviderStatus::Failed {
                tracing::warn!(
                    provider = %provider,
                    consecutive_failures = entry.consecutive_failures,
                    error = %error_message,
                    "Provider marked FAILED, circuit open"
                );
            } else {
                tracing::info!(provider = %provider, from = %previous, to = %current, "Provider health changed");
            }
            metrics::record_provider_status(provider, current);
        }
        Ok(current)
    }

    /// Administrative override. Returns the previous status.
    pub fn force_status(&self, provider: &ProviderId, status: ProviderStatus) -> Result<ProviderStatus, HealthError> {
        let threshold = self.settings.load().failure_threshold;
        let mut entry = self
            .entries
            .get_mut(provider)
            .ok_or_else(|| HealthError::UnknownProvider(provider.clone()))?;

        let previous = entry.force(status, threshold);
        tracing::warn!(provider = %provider, from = %previous, to = %status, "Provider status forced");
        metrics::record_provider_status(provider, status);
        Ok(previous)
    }

    /// Re-check every entry against the current failure threshold, marking
    /// FAILED those already at or past it. Returns the providers changed.
    pub fn enforce_threshold(&self) -> Vec<ProviderId> {
        let threshold = self.settings.load().failure_threshold;
        let mut changed = Vec::new();
        for provider in &self.priority {
            let Some(mut entry) = self.entries.get_mut(provider) else {
                continue;
            };
            if let Some(previous) = entry.enforce_threshold(threshold) {
                tracing::warn!(
                    provider = %provider,
                    from = %previous,
                    consecutive_failures = entry.consecutive_failures,
                    failure_threshold = threshold,
                    "Provider marked FAILED under new failure threshold, circuit open"
                );
                metrics::record_provider_status(provider, ProviderStatus::Failed);
                changed.push(provider.clone());
            }
        }
        changed
    }
}
