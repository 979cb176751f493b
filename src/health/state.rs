//! Provider health state machine.
//!
//! # States
//! - UNKNOWN: never checked, treated as eligible
//! - HEALTHY: last attempt succeeded
//! - DEGRADED: failing, but below the failure threshold
//! - FAILED: consecutive failures reached the threshold; unavailable
//!
//! # State Transitions
//! ```text
//! any → HEALTHY: any success (consecutive failures reset to 0)
//! any → DEGRADED: failure with consecutive failures < threshold
//! any → FAILED: failure with consecutive failures >= threshold
//! ```
//!
//! # Design Decisions
//! - Transitions live here as plain methods; the registry only stores entries
//! - Wall-clock timestamps are for reporting, `Instant`s drive the breaker

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::time::Instant;

use crate::events::unix_millis;
use crate::provider::ProviderId;
use crate::resilience::CircuitState;

/// Health status of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderStatus {
    Healthy,
    Degraded,
    Failed,
    Unknown,
}

impl ProviderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderStatus::Healthy => "HEALTHY",
            ProviderStatus::Degraded => "DEGRADED",
            ProviderStatus::Failed => "FAILED",
            ProviderStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HEALTHY" => Ok(ProviderStatus::Healthy),
            "DEGRADED" => Ok(ProviderStatus::Degraded),
            "FAILED" => Ok(ProviderStatus::Failed),
            "UNKNOWN" => Ok(ProviderStatus::Unknown),
            _ => Err(format!("unknown provider status '{}'", s)),
        }
    }
}

/// Mutable per-provider health entry.
#[derive(Debug, Clone)]
pub struct ProviderHealth {
    pub provider: ProviderId,
    pub status: ProviderStatus,
    /// Monotonic time of the last probe or operation.
    pub last_checked: Option<Instant>,
    /// Wall-clock milliseconds of the last probe or operation.
    pub last_checked_at: Option<u64>,
    pub response_time_ms: Option<u64>,
    pub success_rate: f64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub last_success_at: Option<u64>,
}

impl ProviderHealth {
    pub fn new(provider: ProviderId) -> Self {
        Self {
            provider,
            status: ProviderStatus::Unknown,
            last_checked: None,
            last_checked_at: None,
            response_time_ms: None,
            success_rate: 1.0,
            consecutive_failures: 0,
            last_error: None,
            last_success_at: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status != ProviderStatus::Failed
    }

    fn touch(&mut self) {
        self.last_checked = Some(Instant::now());
        self.last_checked_at = Some(unix_millis());
    }

    /// Apply a success. Returns the previous status.
    pub fn apply_success(&mut self, latency_ms: u64, success_rate: Option<f64>) -> ProviderStatus {
        let previous = self.status;
        self.touch();
        self.status = ProviderStatus::Healthy;
        self.consecutive_failures = 0;
        self.last_error = None;
        self.response_time_ms = Some(latency_ms);
        self.last_success_at = self.last_checked_at;
        if let Some(rate) = success_rate {
            self.success_rate = rate;
        }
        previous
    }

    /// Apply a failure against `failure_threshold`. Returns the previous status.
    pub fn apply_failure(
        &mut self,
        error_message: &str,
        failure_threshold: u32,
        success_rate: Option<f64>,
    ) -> ProviderStatus {
        let previous = self.status;
        self.touch();
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_error = Some(error_message.to_string());
        self.status = if self.consecutive_failures >= failure_threshold {
            ProviderStatus::Failed
        } else {
            ProviderStatus::Degraded
        };
        if let Some(rate) = success_rate {
            self.success_rate = rate;
        }
        previous
    }

    /// Administrative override. Returns the previous status.
    ///
    /// Forcing DEGRADED keeps `consecutive_failures` below `failure_threshold`.
    pub fn force(&mut self, status: ProviderStatus, failure_threshold: u32) -> ProviderStatus {
        let previous = self.status;
        self.touch();
        self.status = status;
        match status {
            ProviderStatus::Healthy | ProviderStatus::Unknown => {
                self.consecutive_failures = 0;
                self.last_error = None;
            }
            ProviderStatus::Failed => {
                self.last_error = Some("forced FAILED by operator".to_string());
            }
            ProviderStatus::Degraded => {
                self.consecutive_failures = self
                    .consecutive_failures
                    .min(failure_threshold.saturating_sub(1));
            }
        }
        previous
    }

    /// Mark FAILED if the failure count already meets `failure_threshold`.
    /// Returns the previous status when it changed. `last_checked` is kept,
    /// so the cooldown still counts from the last real check.
    pub fn enforce_threshold(&mut self, failure_threshold: u32) -> Option<ProviderStatus> {
        if self.status == ProviderStatus::Failed || self.consecutive_failures < failure_threshold {
            return None;
        }
        let previous = self.status;
        self.status = ProviderStatus::Failed;
        Some(previous)
    }

    pub fn view(&self, circuit_state: CircuitState) -> ProviderHealthView {
        ProviderHealthView {
            provider: self.provider.clone(),
            status: self.status,
            circuit_state,
            is_available: self.is_available(),
            last_checked_at: self.last_checked_at,
            response_time_ms: self.response_time_ms,
            success_rate: self.success_rate,
            consecutive_failures: self.consecutive_failures,
            last_error: self.last_error.clone(),
            last_success_at: self.last_success_at,
        }
    }
}

/// Read-only health snapshot for dashboards and the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderHealthView {
    pub provider: ProviderId,
    pub status: ProviderStatus,
    pub circuit_state: CircuitState,
    pub is_available: bool,
    pub last_checked_at: Option<u64>,
    pub response_time_ms: Option<u64>,
    pub success_rate: f64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub last_success_at: Option<u64>,
}
