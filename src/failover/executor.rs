//! Sequential failover across ranked candidates.

use serde_json::Value;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tokio::time::Instant;

use crate::config::SharedSettings;
use crate::events::{FailoverEvent, FailoverEventLog, OperationRecord, OperationStore};
use crate::failover::error::FailoverError;
use crate::failover::fallback::{FallbackContext, FallbackGenerator};
use crate::failover::outcome::{ExecutionOutcome, Exhaustion};
use crate::health::HealthRegistry;
use crate::observability::metrics;
use crate::provider::{OperationType, ProviderId};
use crate::resilience::{run_attempt, AttemptFailure};
use crate::selection::ProviderSelector;

pub struct FailoverExecutor {
    selector: Arc<ProviderSelector>,
    registry: Arc<HealthRegistry>,
    store: Arc<dyn OperationStore>,
    events: Arc<FailoverEventLog>,
    fallback: Arc<dyn FallbackGenerator>,
    settings: SharedSettings,
}

impl FailoverExecutor {
    pub fn new(
        selector: Arc<ProviderSelector>,
        registry: Arc<HealthRegistry>,
        store: Arc<dyn OperationStore>,
        events: Arc<FailoverEventLog>,
        fallback: Arc<dyn FallbackGenerator>,
        settings: SharedSettings,
    ) -> Self {
        Self {
            selector,
            registry,
            store,
            events,
            fallback,
            settings,
        }
    }

    /// Run `call` against each eligible provider in order until one succeeds.
    ///
    /// `call` receives the provider and the user identity. Each attempt is
    /// bounded by the configured attempt timeout; a timed-out attempt is
    /// dropped and counts as a failure. Only exhaustion is visible to the
    /// caller, as a fallback payload or, with degraded mode off, an error.
    pub async fn execute<F, Fut, E>(
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
        let candidates = self.selector.candidates(user_id, &operation);
        if candidates.is_empty() {
            tracing::warn!(user_id = %user_id, operation = %operation, "No eligible provider");
            return self.exhausted(user_id, operation, Exhaustion::NoEligibleProvider, Vec::new(), None);
        }

        let deadline = self.settings.load().attempt_timeout();
        let mut attempted = Vec::with_capacity(candidates.len());
        let mut last_error = None;

        for (index, provider) in candidates.iter().enumerate() {
            attempted.push(provider.clone());
            let started = Instant::now();
            let result = run_attempt(deadline, call(provider.clone(), user_id.to_string())).await;
            let elapsed = started.elapsed();
            let elapsed_ms = elapsed.as_millis() as u64;

            match result {
                Ok(data) => {
                    metrics::record_attempt(provider, &operation, true, elapsed);
                    self.note_success(user_id, provider, &operation, elapsed_ms);
                    if index > 0 {
                        tracing::info!(
                            provider = %provider,
                            operation = %operation,
                            attempts = attempted.len(),
                            "Failover succeeded"
                        );
                    }
                    return Ok(ExecutionOutcome::served(provider.clone(), attempted, data));
                }
                Err(failure) => {
                    metrics::record_attempt(provider, &operation, false, elapsed);
                    let next = candidates.get(index + 1).cloned();
                    self.note_failure(user_id, provider, &operation, &failure, elapsed_ms, next);
                    last_error = Some(failure.message());
                }
            }
        }

        self.exhausted(user_id, operation, Exhaustion::AllProvidersFailed, attempted, last_error)
    }

    fn note_success(&self, user_id: &str, provider: &ProviderId, operation: &OperationType, elapsed_ms: u64) {
        let record = OperationRecord::success(user_id, provider.clone(), operation.clone(), elapsed_ms);
        if let Err(e) = self.store.append(record) {
            tracing::error!(provider = %provider, error = %e, "Failed to record operation");
        }
        if let Err(e) = self.registry.record_success(provider, elapsed_ms) {
            tracing::error!(provider = %provider, error = %e, "Failed to update provider health");
        }
    }

    fn note_failure(
        &self,
        user_id: &str,
        provider: &ProviderId,
        operation: &OperationType,
        failure: &AttemptFailure,
        elapsed_ms: u64,
        next: Option<ProviderId>,
    ) {
        let message = failure.message();
        let reason = failure.reason();
        tracing::warn!(
            provider = %provider,
            operation = %operation,
            reason = %reason,
            error = %message,
            next = ?next.as_ref().map(ProviderId::as_str),
            "Provider attempt failed"
        );
        metrics::record_failover(provider, reason);

        let record = OperationRecord::failure(user_id, provider.clone(), operation.clone(), message.clone(), elapsed_ms);
        if let Err(e) = self.store.append(record) {
            tracing::error!(provider = %provider, error = %e, "Failed to record operation");
        }
        if let Err(e) = self.registry.record_failure(provider, &message) {
            tracing::error!(provider = %provider, error = %e, "Failed to update provider health");
        }
        self.events.push(FailoverEvent::new(
            provider.clone(),
            next,
            reason,
            user_id,
            operation.clone(),
            message,
        ));
    }

    fn exhausted(
        &self,
        user_id: &str,
        operation: OperationType,
        exhaustion: Exhaustion,
        attempted: Vec<ProviderId>,
        last_error: Option<String>,
    ) -> Result<ExecutionOutcome, FailoverError> {
        if !self.settings.load().degraded_mode_enabled {
            tracing::error!(
                user_id = %user_id,
                operation = %operation,
                attempted = ?attempted,
                "Providers exhausted and degraded mode disabled"
            );
            return Err(match exhaustion {
                Exhaustion::NoEligibleProvider => FailoverError::NoEligibleProvider { operation },
                Exhaustion::AllProvidersFailed => FailoverError::AllProvidersFailed {
                    operation,
                    attempted_providers: attempted,
                    last_error: last_error.unwrap_or_default(),
                },
            });
        }

        let ctx = FallbackContext {
            user_id,
            operation: &operation,
            attempted_providers: &attempted,
            last_error: last_error.as_deref(),
            exhaustion,
        };
        let data = self.fallback.generate(&ctx);
        let reason = ctx.reason();
        tracing::warn!(
            user_id = %user_id,
            operation = %operation,
            cause = exhaustion.as_str(),
            reason = %reason,
            "Serving fallback response"
        );
        metrics::record_fallback(&operation, exhaustion.as_str());
        Ok(ExecutionOutcome::degraded(data, attempted, exhaustion, reason))
    }
}
