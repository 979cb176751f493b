//! Provider failover and health management.
//!
//! Wraps calls to a small set of interchangeable external providers with
//! health tracking, circuit breaking, ordered failover and a degraded-mode
//! fallback. See [`service::FailoverService`] for the entry point.

pub mod admin;
pub mod config;
pub mod events;
pub mod failover;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod provider;
pub mod resilience;
pub mod selection;
pub mod service;

pub use config::AppConfig;
pub use failover::{ExecutionOutcome, Exhaustion, FailoverError, OutcomeKind};
pub use health::{ProviderHealthView, ProviderStatus};
pub use lifecycle::Shutdown;
pub use provider::{OperationType, ProviderId};
pub use service::{Collaborators, FailoverService, ProviderStatusReport};
