//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Executor, registry, probe loop produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (provider, user_id, operation, reason) on every event
//! - Metrics are cheap (atomic increments), recorded even with no exporter

pub mod logging;
pub mod metrics;
