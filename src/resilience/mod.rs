//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Provider attempt:
//!     → timeouts.rs (every attempt has a deadline)
//!     → On failure: classify.rs (map error text to a FailoverReason)
//!     → health registry records the failure
//!     → circuit_breaker.rs (derive Open/Half-Open/Closed from health)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - A timeout is a failure reason like any other, never a silent drop
//! - Breaker state is derived from health, never stored separately
//! - Classification is a pure function so the heuristic stays isolated

pub mod circuit_breaker;
pub mod classify;
pub mod timeouts;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use classify::{classify, FailoverReason};
pub use timeouts::{run_attempt, AttemptFailure};
