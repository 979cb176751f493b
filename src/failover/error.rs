//! Hard failure when degraded mode is disabled.

use thiserror::Error;

use crate::failover::outcome::Exhaustion;
use crate::provider::{OperationType, ProviderId};

#[derive(Debug, Clone, Error)]
pub enum FailoverError {
    #[error("no eligible provider for {operation}")]
    NoEligibleProvider { operation: OperationType },

    #[error("all providers failed for {operation}: {last_error}")]
    AllProvidersFailed {
        operation: OperationType,
        attempted_providers: Vec<ProviderId>,
        last_error: String,
    },
}

impl FailoverError {
    pub fn attempted_providers(&self) -> &[ProviderId] {
        match self {
            FailoverError::NoEligibleProvider { .. } => &[],
            FailoverError::AllProvidersFailed { attempted_providers, .. } => attempted_providers,
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        match self {
            FailoverError::NoEligibleProvider { .. } => None,
            FailoverError::AllProvidersFailed { last_error, .. } => Some(last_error),
        }
    }

    pub fn exhaustion(&self) -> Exhaustion {
        match self {
            FailoverError::NoEligibleProvider { .. } => Exhaustion::NoEligibleProvider,
            FailoverError::AllProvidersFailed { .. } => Exhaustion::AllProvidersFailed,
        }
    }

    /// A hard error is only produced when degraded mode is off.
    pub fn fallback_available(&self) -> bool {
        false
    }
}
