//! Health-ranked provider selection.

use std::cmp::Ordering;
use std::sync::Arc;
use tokio::time::Instant;

use crate::config::SharedSettings;
use crate::health::state::{ProviderHealth, ProviderStatus};
use crate::health::HealthRegistry;
use crate::provider::{CredentialStore, OperationType, ProviderId};

pub struct ProviderSelector {
    registry: Arc<HealthRegistry>,
    credentials: Arc<dyn CredentialStore>,
    settings: SharedSettings,
}

impl ProviderSelector {
    pub fn new(registry: Arc<HealthRegistry>, credentials: Arc<dyn CredentialStore>, settings: SharedSettings) -> Self {
        Self {
            registry,
            credentials,
            settings,
        }
    }

    /// Every eligible provider for `user_id`, best first.
    pub fn candidates(&self, user_id: &str, operation: &OperationType) -> Vec<ProviderId> {
        let configured = self.credentials.provider_credentials(user_id);
        let breaker = self.settings.load().circuit_breaker();
        let now = Instant::now();

        let mut eligible: Vec<ProviderHealth> = Vec::new();
        for provider in self.registry.providers() {
            if !configured.get(provider).copied().unwrap_or(false) {
                continue;
            }
            let Some(health) = self.registry.get(provider) else {
                continue;
            };
            if !breaker.allows(&health, now) {
                tracing::debug!(provider = %provider, user_id = %user_id, "Skipping provider, circuit open");
                continue;
            }
            eligible.push(health);
        }

        eligible.sort_by(rank);

        let ordered: Vec<ProviderId> = eligible.into_iter().map(|h| h.provider).collect();
        tracing::debug!(
            user_id = %user_id,
            operation = %operation,
            candidates = ?ordered,
            "Candidate providers selected"
        );
        ordered
    }

    /// The single best provider, if any is eligible.
    pub fn select_best(&self, user_id: &str, operation: &OperationType) -> Option<ProviderId> {
        self.candidates(user_id, operation).into_iter().next()
    }
}

fn rank(a: &ProviderHealth, b: &ProviderHealth) -> Ordering {
    let healthy = |h: &ProviderHealth| h.status == ProviderStatus::Healthy;
    healthy(b)
        .cmp(&healthy(a))
        .then_with(|| b.success_rate.total_cmp(&a.success_rate))
        .then_with(|| {
            a.response_time_ms
                .unwrap_or(u64::MAX)
                .cmp(&b.response_time_ms.unwrap_or(u64::MAX))
        })
}
