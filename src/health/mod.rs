//! Health tracking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → Probe each provider (connectivity check, bounded timeout)
//!     → registry.rs record_success / record_failure
//!
//! Passive health (failover executor):
//!     Provider attempt finished
//!     → registry.rs record_success / record_failure
//!
//! State machine (state.rs):
//!     UNKNOWN → HEALTHY ←→ DEGRADED → FAILED
//!     Any success resets to HEALTHY
//! ```
//!
//! # Design Decisions
//! - Active and passive signals feed the same registry entries
//! - "Is the provider alive" is refreshed without user traffic
//! - Health state is per-provider, process-wide, never per-request

pub mod active;
pub mod registry;
pub mod state;

pub use active::HealthMonitor;
pub use registry::{HealthError, HealthRegistry};
pub use state::{ProviderHealth, ProviderHealthView, ProviderStatus};
