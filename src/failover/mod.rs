//! Failover execution subsystem.
//!
//! # Data Flow
//! ```text
//! execute(user_id, operation, callback)
//!     → selection (ordered, breaker-filtered candidates)
//!     → empty? → fallback.rs (NoEligibleProvider)
//!     → executor.rs: for each candidate, strictly in order
//!         TRYING(p) → callback under attempt timeout
//!             success → record, return outcome.rs (SUCCEEDED)
//!             failure → classify, record, FailoverEvent, TRYING(next)
//!     → all failed → fallback.rs (AllProvidersFailed) (EXHAUSTED)
//!         degraded mode on  → synthetic payload, fallback_used = true
//!         degraded mode off → error.rs FailoverError
//! ```
//!
//! # Design Decisions
//! - Candidates are tried sequentially, never raced
//! - A single provider's failure never reaches the caller
//! - Bookkeeping failures are logged and swallowed
//! - Fallback payloads match the success payload shape per operation

pub mod error;
pub mod executor;
pub mod fallback;
pub mod outcome;

pub use error::FailoverError;
pub use executor::FailoverExecutor;
pub use fallback::{DefaultFallbackGenerator, FallbackContext, FallbackGenerator};
pub use outcome::{ExecutionOutcome, Exhaustion, OutcomeKind};
