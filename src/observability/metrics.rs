//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define failover metrics (attempts, latency, failovers, fallbacks, health)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `failover_attempts_total` (counter): attempts by provider, operation, outcome
//! - `failover_attempt_duration_seconds` (histogram): provider latency
//! - `failover_events_total` (counter): failovers by provider, reason
//! - `failover_fallbacks_total` (counter): degraded results by operation, cause
//! - `failover_provider_status` (gauge): 1 healthy, 0.5 degraded, 0 failed, -1 unknown
//! - `failover_health_checks_total` (counter): probes by provider, result

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

use crate::health::state::ProviderStatus;
use crate::provider::{OperationType, ProviderId};
use crate::resilience::FailoverReason;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_attempt(provider: &ProviderId, operation: &OperationType, success: bool, elapsed: Duration) {
    let outcome = if success { "success" } else { "failure" };
    counter!(
        "failover_attempts_total",
        "provider" => provider.to_string(),
        "operation" => operation.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!(
        "failover_attempt_duration_seconds",
        "provider" => provider.to_string(),
        "operation" => operation.to_string()
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_failover(provider: &ProviderId, reason: FailoverReason) {
    counter!(
        "failover_events_total",
        "provider" => provider.to_string(),
        "reason" => reason.as_str()
    )
    .increment(1);
}

pub fn record_fallback(operation: &OperationType, cause: &'static str) {
    counter!(
        "failover_fallbacks_total",
        "operation" => operation.to_string(),
        "cause" => cause
    )
    .increment(1);
}

pub fn record_provider_status(provider: &ProviderId, status: ProviderStatus) {
    let value = match status {
        ProviderStatus::Healthy => 1.0,
        ProviderStatus::Degraded => 0.5,
        ProviderStatus::Failed => 0.0,
        ProviderStatus::Unknown => -1.0,
    };
    gauge!("failover_provider_status", "provider" => provider.to_string()).set(value);
}

pub fn record_health_check(provider: &ProviderId, healthy: bool) {
    let result = if healthy { "healthy" } else { "unhealthy" };
    counter!(
        "failover_health_checks_total",
        "provider" => provider.to_string(),
        "result" => result
    )
    .increment(1);
}
