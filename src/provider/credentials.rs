//! Per-user provider credential lookup.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::UserCredentialsConfig;
use crate::provider::ProviderId;

/// Answers which providers a user has configured.
///
/// The map value is `true` when the stored credential is non-empty. Lookups
/// are synchronous; implementations backed by a database are expected to
/// keep a cache warm rather than block here.
pub trait CredentialStore: Send + Sync {
    fn provider_credentials(&self, user_id: &str) -> HashMap<ProviderId, bool>;
}

/// A thread-safe in-memory credential presence table.
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    inner: Arc<DashMap<String, HashMap<ProviderId, bool>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from `[[credentials]]` config entries.
    pub fn from_config(entries: &[UserCredentialsConfig]) -> Self {
        let store = Self::new();
        for entry in entries {
            for provider in &entry.providers {
                store.set_credential(&entry.user_id, ProviderId::from(provider.as_str()), true);
            }
        }
        tracing::info!(users = store.inner.len(), "Credential store seeded");
        store
    }

    /// Record whether `user_id` has a usable credential for `provider`.
    pub fn set_credential(&self, user_id: &str, provider: ProviderId, configured: bool) {
        self.inner
            .entry(user_id.to_string())
            .or_default()
            .insert(provider, configured);
    }

    pub fn remove_user(&self, user_id: &str) {
        self.inner.remove(user_id);
    }

    pub fn user_count(&self) -> usize {
        self.inner.len()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn provider_credentials(&self, user_id: &str) -> HashMap<ProviderId, bool> {
        self.inner
            .get(user_id)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }
}
