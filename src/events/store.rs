//! Operation records and the append-only store behind rolling success rates.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::events::unix_millis;
use crate::provider::{OperationType, ProviderId};

/// One attempted provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub user_id: String,
    pub provider: ProviderId,
    pub operation_type: OperationType,
    pub success: bool,
    pub error_message: Option<String>,
    pub response_time_ms: u64,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl OperationRecord {
    pub fn success(user_id: &str, provider: ProviderId, operation_type: OperationType, response_time_ms: u64) -> Self {
        Self {
            user_id: user_id.to_string(),
            provider,
            operation_type,
            success: true,
            error_message: None,
            response_time_ms,
            created_at: unix_millis(),
        }
    }

    pub fn failure(
        user_id: &str,
        provider: ProviderId,
        operation_type: OperationType,
        error_message: impl Into<String>,
        response_time_ms: u64,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            provider,
            operation_type,
            success: false,
            error_message: Some(error_message.into()),
            response_time_ms,
            created_at: unix_millis(),
        }
    }
}

/// Errors raised by operation stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable sink for operation records.
pub trait OperationStore: Send + Sync {
    fn append(&self, record: OperationRecord) -> Result<(), StoreError>;

    /// The trailing `limit` records for `provider`, oldest first.
    fn recent(&self, provider: &ProviderId, limit: usize) -> Result<Vec<OperationRecord>, StoreError>;
}

/// Fraction of successful records, or `None` when there are none.
pub fn success_rate(records: &[OperationRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let successes = records.iter().filter(|r| r.success).count();
    Some(successes as f64 / records.len() as f64)
}

/// In-memory store with bounded per-provider history and JSON snapshots.
#[derive(Clone)]
pub struct MemoryOperationStore {
    inner: Arc<DashMap<ProviderId, VecDeque<OperationRecord>>>,
    retention: usize,
    persistence_path: Option<PathBuf>,
}

impl MemoryOperationStore {
    pub fn new(retention: usize, persistence_path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            retention,
            persistence_path,
        }
    }

    /// Load a snapshot if one exists at `path`; later saves go back to it.
    pub fn load_from_file(path: &Path, retention: usize) -> Result<Self, StoreError> {
        let store = Self::new(retention, Some(path.to_path_buf()));
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let map: HashMap<ProviderId, Vec<OperationRecord>> = serde_json::from_reader(reader)?;
            for (provider, records) in map {
                let mut history: VecDeque<OperationRecord> = records.into();
                while history.len() > retention {
                    history.pop_front();
                }
                store.inner.insert(provider, history);
            }
            tracing::info!(
                path = %path.display(),
                records = store.total_records(),
                "Loaded operation records"
            );
        }
        Ok(store)
    }

    pub fn save_to_file(&self) -> Result<(), StoreError> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };
        let map: HashMap<ProviderId, Vec<OperationRecord>> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().iter().cloned().collect()))
            .collect();

        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, &map)?;
        tracing::info!(path = %path.display(), records = self.total_records(), "Saved operation records");
        Ok(())
    }

    pub fn total_records(&self) -> usize {
        self.inner.iter().map(|r| r.value().len()).sum()
    }
}

impl OperationStore for MemoryOperationStore {
    fn append(&self, record: OperationRecord) -> Result<(), StoreError> {
        let mut history = self.inner.entry(record.provider.clone()).or_default();
        history.push_back(record);
        while history.len() > self.retention {
            history.pop_front();
        }
        Ok(())
    }

    fn recent(&self, provider: &ProviderId, limit: usize) -> Result<Vec<OperationRecord>, StoreError> {
        Ok(self
            .inner
            .get(provider)
            .map(|history| {
                let skip = history.len().saturating_sub(limit);
                history.iter().skip(skip).cloned().collect()
            })
            .unwrap_or_default())
    }
}
