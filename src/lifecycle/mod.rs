//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Open operation store → Build service
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → shutdown
//!     SIGHUP → config reload
//!
//! Shutdown (shutdown.rs):
//!     trigger → admin server drains, probe loop exits → store saved
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Probe loop stops before the store is persisted

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::{Signal, SignalListener};
pub use startup::{build_runtime, Runtime, StartupError};
