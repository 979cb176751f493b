//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use provider_failover::config::{FailoverSettings, HealthCheckConfig};
use provider_failover::events::{MemoryOperationStore, OperationRecord, OperationStore, StoreError};
use provider_failover::provider::{ConnectivityCheck, ConnectivityReport, InMemoryCredentialStore};
use provider_failover::{Collaborators, FailoverService, ProviderId};

pub const PROVIDERS: [&str; 4] = ["openai", "anthropic", "google", "groq"];

/// How a scripted connectivity check answers for one provider.
#[derive(Debug, Clone)]
pub enum Probe {
    Healthy,
    Unhealthy(&'static str),
    Hang,
    Panic,
}

/// Connectivity check whose answers are set per provider by the test.
#[derive(Default)]
pub struct ScriptedConnectivity {
    script: Mutex<HashMap<ProviderId, Probe>>,
    calls: Mutex<Vec<ProviderId>>,
}

impl ScriptedConnectivity {
    pub fn set(&self, provider: &str, probe: Probe) {
        self.script.lock().unwrap().insert(provider.into(), probe);
    }

    pub fn calls(&self) -> Vec<ProviderId> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConnectivityCheck for ScriptedConnectivity {
    async fn check(&self, provider: &ProviderId, _test_user_id: &str) -> ConnectivityReport {
        self.calls.lock().unwrap().push(provider.clone());
        let probe = self
            .script
            .lock()
            .unwrap()
            .get(provider)
            .cloned()
            .unwrap_or(Probe::Healthy);
        match probe {
            Probe::Healthy => ConnectivityReport::healthy("ok"),
            Probe::Unhealthy(message) => ConnectivityReport::unhealthy(message),
            Probe::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            Probe::Panic => panic!("probe exploded"),
        }
    }
}

/// Operation store that rejects every write and read.
pub struct BrokenStore;

impl OperationStore for BrokenStore {
    fn append(&self, _record: OperationRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".into()))
    }

    fn recent(&self, _provider: &ProviderId, _limit: usize) -> Result<Vec<OperationRecord>, StoreError> {
        Err(StoreError::Unavailable("disk full".into()))
    }
}

pub struct Harness {
    pub service: Arc<FailoverService>,
    pub store: Arc<MemoryOperationStore>,
    pub credentials: InMemoryCredentialStore,
    pub connectivity: Arc<ScriptedConnectivity>,
}

/// Health checks disabled by default; tests opt in.
pub fn quiet_health_config() -> HealthCheckConfig {
    HealthCheckConfig {
        enabled: false,
        ..HealthCheckConfig::default()
    }
}

pub fn harness(settings: FailoverSettings, health_check: HealthCheckConfig) -> Harness {
    let store = Arc::new(MemoryOperationStore::new(1000, None));
    let credentials = InMemoryCredentialStore::new();
    let connectivity = Arc::new(ScriptedConnectivity::default());
    let collaborators = Collaborators::new(
        Arc::new(credentials.clone()),
        connectivity.clone(),
        store.clone(),
    );
    let service = Arc::new(FailoverService::from_parts(
        PROVIDERS.iter().map(|p| ProviderId::from(*p)).collect(),
        settings,
        health_check,
        collaborators,
    ));
    Harness {
        service,
        store,
        credentials,
        connectivity,
    }
}

impl Harness {
    /// Give `user_id` a credential for each of `providers`.
    pub fn configure(&self, user_id: &str, providers: &[&str]) {
        for provider in providers {
            self.credentials.set_credential(user_id, (*provider).into(), true);
        }
    }
}

/// Start a mock HTTP server on an ephemeral port; `f` picks each response.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let (status, body) = f().await;
                let status_text = match status {
                    200 => "200 OK",
                    401 => "401 Unauthorized",
                    429 => "429 Too Many Requests",
                    500 => "500 Internal Server Error",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
                tokio::time::sleep(Duration::from_millis(10)).await;
            });
        }
    });

    addr
}
