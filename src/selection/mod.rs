//! Provider selection subsystem.
//!
//! # Data Flow
//! ```text
//! (user_id, operation)
//!     → fixed priority list of known providers
//!     → keep providers the user has a non-empty credential for
//!     → drop providers whose circuit breaker is Open
//!     → rank: HEALTHY first, then success rate desc, then latency asc
//!     → ordered candidate list (executor) or its head (select_best)
//! ```
//!
//! # Design Decisions
//! - Selection is synchronous and in-memory; no suspension points
//! - Stable sort keeps priority order among equally ranked providers
//! - Deterministic for identical health snapshots

pub mod selector;

pub use selector::ProviderSelector;
