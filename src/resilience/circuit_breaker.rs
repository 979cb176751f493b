//! Circuit breaker for provider protection.
//!
//! # States
//! - Closed: status is HEALTHY, DEGRADED or UNKNOWN, attempts allowed
//! - Open: status is FAILED, provider skipped
//! - Half-Open: FAILED but the cooldown has elapsed since the last check
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures reach the threshold (status FAILED)
//! Open → Half-Open: circuit_breaker_timeout elapsed since last check
//! Half-Open → Closed: next attempt (probe or user request) succeeds
//! Half-Open → Open: next attempt fails (last check is re-stamped)
//! ```
//!
//! # Design Decisions
//! - Derived entirely from ProviderHealth; nothing stored here
//! - UNKNOWN is optimistic: never-checked providers are eligible
//! - Half-Open admits every concurrent caller; there is no trial token

use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

use crate::health::state::{ProviderHealth, ProviderStatus};

/// Breaker gate derived from provider health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn allows_attempt(&self) -> bool {
        !matches!(self, CircuitState::Open)
    }
}

/// Evaluates breaker state with a fixed cooldown.
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreaker {
    cooldown: Duration,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    pub fn state(&self, health: &ProviderHealth, now: Instant) -> CircuitState {
        if health.status != ProviderStatus::Failed {
            return CircuitState::Closed;
        }
        match health.last_checked {
            Some(checked) if now.saturating_duration_since(checked) < self.cooldown => CircuitState::Open,
            _ => CircuitState::HalfOpen,
        }
    }

    pub fn allows(&self, health: &ProviderHealth, now: Instant) -> bool {
        self.state(health, now).allows_attempt()
    }
}
