//! Result annotation for failover executions.

use serde::Serialize;
use serde_json::Value;

use crate::provider::ProviderId;

/// Why no provider produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exhaustion {
    /// The user has no configured provider whose breaker allows an attempt.
    NoEligibleProvider,
    /// Every eligible provider was attempted and failed.
    AllProvidersFailed,
}

impl Exhaustion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exhaustion::NoEligibleProvider => "no_eligible_provider",
            Exhaustion::AllProvidersFailed => "all_providers_failed",
        }
    }
}

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The first candidate served the request.
    Success,
    /// A later candidate served the request.
    FailoverSuccess,
    /// No provider served it; `data` is a synthetic payload.
    Degraded,
}

/// A successful or degraded execution result.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionOutcome {
    pub data: Value,
    pub provider_used: Option<ProviderId>,
    pub failover_attempted: bool,
    /// Providers actually invoked, in order.
    pub attempted_providers: Vec<ProviderId>,
    pub fallback_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exhaustion: Option<Exhaustion>,
}

impl ExecutionOutcome {
    pub fn served(provider: ProviderId, attempted_providers: Vec<ProviderId>, data: Value) -> Self {
        Self {
            data,
            provider_used: Some(provider),
            failover_attempted: attempted_providers.len() > 1,
            attempted_providers,
            fallback_used: false,
            fallback_reason: None,
            exhaustion: None,
        }
    }

    pub fn degraded(
        data: Value,
        attempted_providers: Vec<ProviderId>,
        exhaustion: Exhaustion,
        reason: String,
    ) -> Self {
        Self {
            data,
            provider_used: None,
            failover_attempted: attempted_providers.len() > 1,
            attempted_providers,
            fallback_used: true,
            fallback_reason: Some(reason),
            exhaustion: Some(exhaustion),
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        if self.fallback_used {
            OutcomeKind::Degraded
        } else if self.failover_attempted {
            OutcomeKind::FailoverSuccess
        } else {
            OutcomeKind::Success
        }
    }
}
