//! Startup orchestration.
//!
//! Builds the concrete collaborators named in config and hands them to the
//! service. Errors here are fatal.

use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::events::{MemoryOperationStore, StoreError};
use crate::provider::{HttpConnectivityCheck, InMemoryCredentialStore};
use crate::service::{Collaborators, FailoverService};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open operation store: {0}")]
    Store(#[from] StoreError),

    #[error("failed to build connectivity client: {0}")]
    Http(#[from] reqwest::Error),
}

/// A wired service plus handles the daemon needs at shutdown.
pub struct Runtime {
    pub service: Arc<FailoverService>,
    pub store: Arc<MemoryOperationStore>,
    pub credentials: InMemoryCredentialStore,
}

pub fn build_runtime(config: &AppConfig) -> Result<Runtime, StartupError> {
    let retention = config.store.retention_per_provider;
    let store = match &config.store.persistence_path {
        Some(path) => MemoryOperationStore::load_from_file(path, retention)?,
        None => MemoryOperationStore::new(retention, None),
    };
    let store = Arc::new(store);

    let credentials = InMemoryCredentialStore::from_config(&config.credentials);
    let connectivity = HttpConnectivityCheck::new(&config.providers, config.health_check.timeout())?;

    let collaborators = Collaborators::new(
        Arc::new(credentials.clone()),
        Arc::new(connectivity),
        store.clone(),
    );
    let service = Arc::new(FailoverService::new(config, collaborators));

    tracing::info!(
        providers = ?config.provider_names(),
        users = credentials.user_count(),
        degraded_mode = config.failover.degraded_mode_enabled,
        "Failover service initialized"
    );

    Ok(Runtime {
        service,
        store,
        credentials,
    })
}
