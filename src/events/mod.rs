//! Event and operation log.
//!
//! # Data Flow
//! ```text
//! Failover executor attempt finished
//!     → store.rs (append OperationRecord, durable)
//!     → log.rs (append FailoverEvent on failure, bounded ring)
//!
//! Health registry recomputes success rate
//!     → store.rs (read trailing N records for the provider)
//!
//! Status snapshot
//!     → log.rs (recent failover events)
//! ```
//!
//! # Design Decisions
//! - Records and events are immutable once appended
//! - The event ring is for observability only, never for control decisions
//! - Store reads are synchronous and in-memory

pub mod log;
pub mod store;

use std::time::{SystemTime, UNIX_EPOCH};

pub use log::{FailoverEvent, FailoverEventLog};
pub use store::{success_rate, MemoryOperationStore, OperationRecord, OperationStore, StoreError};

/// Wall-clock milliseconds since the Unix epoch.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
