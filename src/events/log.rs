//! Bounded in-memory ring of failover transitions.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use uuid::Uuid;

use crate::events::unix_millis;
use crate::provider::{OperationType, ProviderId};
use crate::resilience::FailoverReason;

/// One provider failing over to the next candidate.
#[derive(Debug, Clone, Serialize)]
pub struct FailoverEvent {
    pub id: Uuid,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub from_provider: ProviderId,
    /// The candidate tried next, if any remained.
    pub to_provider: Option<ProviderId>,
    pub reason: FailoverReason,
    pub user_id: String,
    pub operation_type: OperationType,
    pub error_details: String,
}

impl FailoverEvent {
    pub fn new(
        from_provider: ProviderId,
        to_provider: Option<ProviderId>,
        reason: FailoverReason,
        user_id: &str,
        operation_type: OperationType,
        error_details: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: unix_millis(),
            from_provider,
            to_provider,
            reason,
            user_id: user_id.to_string(),
            operation_type,
            error_details: error_details.into(),
        }
    }
}

struct Ring {
    events: VecDeque<FailoverEvent>,
    capacity: usize,
}

/// Append-only event buffer that keeps the most recent `capacity` events.
pub struct FailoverEventLog {
    ring: Mutex<Ring>,
}

impl FailoverEventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Mutex::new(Ring {
                events: VecDeque::with_capacity(capacity),
                capacity,
            }),
        }
    }

    pub fn push(&self, event: FailoverEvent) {
        let mut ring = self.ring.lock().unwrap_or_else(|e| e.into_inner());
        if ring.capacity == 0 {
            return;
        }
        while ring.events.len() >= ring.capacity {
            ring.events.pop_front();
        }
        ring.events.push_back(event);
    }

    /// Snapshot of retained events, oldest first.
    pub fn snapshot(&self) -> Vec<FailoverEvent> {
        let ring = self.ring.lock().unwrap_or_else(|e| e.into_inner());
        ring.events.iter().cloned().collect()
    }

    /// Change the retention bound, dropping the oldest events if shrinking.
    pub fn set_capacity(&self, capacity: usize) {
        let mut ring = self.ring.lock().unwrap_or_else(|e| e.into_inner());
        ring.capacity = capacity;
        while ring.events.len() > capacity {
            ring.events.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.ring.lock().unwrap_or_else(|e| e.into_inner()).events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
