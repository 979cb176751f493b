//! Provider connectivity checks used by the health probe loop.
//!
//! # Responsibilities
//! - Answer "can this provider be reached with a configured credential?"
//! - Stay lightweight: one request, no real completion work
//!
//! # Design Decisions
//! - Checks never fail with an error; unreachable is a report, not a panic
//! - Timeouts are enforced by the caller (the probe loop), not here

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::ProviderConfig;
use crate::provider::ProviderId;

/// Outcome of one connectivity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityReport {
    pub healthy: bool,
    pub message: String,
}

impl ConnectivityReport {
    pub fn healthy(message: impl Into<String>) -> Self {
        Self {
            healthy: true,
            message: message.into(),
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            message: message.into(),
        }
    }
}

/// Capability to probe a provider independently of user traffic.
#[async_trait]
pub trait ConnectivityCheck: Send + Sync {
    async fn check(&self, provider: &ProviderId, test_user_id: &str) -> ConnectivityReport;
}

#[derive(Debug, Clone)]
struct ProbeTarget {
    health_url: String,
    api_key_env: Option<String>,
}

/// Probes each provider's configured health URL over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpConnectivityCheck {
    client: reqwest::Client,
    targets: HashMap<ProviderId, ProbeTarget>,
}

impl HttpConnectivityCheck {
    pub fn new(providers: &[ProviderConfig], timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("provider-failover-health-check")
            .build()?;

        let targets = providers
            .iter()
            .map(|p| {
                (
                    ProviderId::from(p.name.as_str()),
                    ProbeTarget {
                        health_url: p.health_url.clone(),
                        api_key_env: p.api_key_env.clone(),
                    },
                )
            })
            .collect();

        Ok(Self { client, targets })
    }
}

#[async_trait]
impl ConnectivityCheck for HttpConnectivityCheck {
    async fn check(&self, provider: &ProviderId, test_user_id: &str) -> ConnectivityReport {
        let Some(target) = self.targets.get(provider) else {
            return ConnectivityReport::unhealthy(format!("no probe target for provider {}", provider));
        };

        let mut request = self.client.get(&target.health_url);
        if let Some(var) = &target.api_key_env {
            match std::env::var(var) {
                Ok(key) if !key.is_empty() => request = request.bearer_auth(key),
                _ => return ConnectivityReport::unhealthy("no credential configured"),
            }
        }

        tracing::debug!(provider = %provider, test_user = %test_user_id, url = %target.health_url, "Probing provider");

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                ConnectivityReport::healthy(format!("status {}", response.status()))
            }
            Ok(response) => {
                ConnectivityReport::unhealthy(format!("non-success status {}", response.status()))
            }
            Err(e) if e.is_timeout() => ConnectivityReport::unhealthy(format!("request timeout: {}", e)),
            Err(e) => ConnectivityReport::unhealthy(format!("network error: {}", e)),
        }
    }
}
