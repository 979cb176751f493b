//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap provider calls and probes with a deadline
//! - Turn both timeouts and errors into one failure shape
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the timed-out future is dropped
//! - Timeout errors are distinct from other errors but recorded the same way

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::resilience::classify::{classify, FailoverReason};

/// Why a bounded attempt did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    TimedOut(Duration),
    Failed(String),
}

impl AttemptFailure {
    pub fn reason(&self) -> FailoverReason {
        match self {
            AttemptFailure::TimedOut(_) => FailoverReason::Timeout,
            AttemptFailure::Failed(message) => classify(message),
        }
    }

    pub fn message(&self) -> String {
        match self {
            AttemptFailure::TimedOut(limit) => format!("attempt timed out after {}ms", limit.as_millis()),
            AttemptFailure::Failed(message) => message.clone(),
        }
    }
}

/// Run `attempt` under `deadline`.
pub async fn run_attempt<F, T, E>(deadline: Duration, attempt: F) -> Result<T, AttemptFailure>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match timeout(deadline, attempt).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(AttemptFailure::Failed(e.to_string())),
        Err(_) => Err(AttemptFailure::TimedOut(deadline)),
    }
}
