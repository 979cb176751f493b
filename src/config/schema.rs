//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the failover
//! daemon. All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::resilience::CircuitBreaker;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Failover, circuit breaker and degraded-mode tuning.
    pub failover: FailoverSettings,

    /// Background health probe settings.
    pub health_check: HealthCheckConfig,

    /// Known providers, in priority order.
    pub providers: Vec<ProviderConfig>,

    /// Seed data for the in-memory credential store.
    pub credentials: Vec<UserCredentialsConfig>,

    /// Operation record storage.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            failover: FailoverSettings::default(),
            health_check: HealthCheckConfig::default(),
            providers: default_providers(),
            credentials: Vec::new(),
            store: StoreConfig::default(),
            observability: ObservabilityConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

impl AppConfig {
    /// Provider names in priority order.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name.clone()).collect()
    }
}

/// Runtime-tunable failover settings. Swapped atomically on reload.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FailoverSettings {
    /// Consecutive failures before a provider is marked FAILED.
    pub failure_threshold: u32,

    /// Seconds an open breaker waits after the last check before a trial.
    pub circuit_breaker_timeout_secs: u64,

    /// Per-attempt provider timeout in seconds.
    pub attempt_timeout_secs: u64,

    /// Return a synthetic payload instead of an error when all providers fail.
    pub degraded_mode_enabled: bool,

    /// Number of trailing operation records used for the success rate.
    pub success_rate_window: usize,

    /// Number of failover events retained for status reporting.
    pub event_buffer_size: usize,
}

impl FailoverSettings {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn circuit_breaker(&self) -> CircuitBreaker {
        CircuitBreaker::new(Duration::from_secs(self.circuit_breaker_timeout_secs))
    }
}

impl Default for FailoverSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            circuit_breaker_timeout_secs: 900,
            attempt_timeout_secs: 30,
            degraded_mode_enabled: true,
            success_rate_window: 100,
            event_buffer_size: 100,
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable the background probe loop.
    pub enabled: bool,

    /// Probe interval in seconds.
    pub interval_secs: u64,

    /// Per-probe timeout in seconds.
    pub timeout_secs: u64,

    /// User identity passed to connectivity checks.
    pub test_user_id: String,
}

impl HealthCheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 300,
            timeout_secs: 30,
            test_user_id: "health-check".to_string(),
        }
    }
}

/// One external provider.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProviderConfig {
    /// Provider identity (e.g., "openai").
    pub name: String,

    /// URL probed by the HTTP connectivity check.
    pub health_url: String,

    /// Environment variable holding the probe credential, if one is required.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

fn default_providers() -> Vec<ProviderConfig> {
    [
        ("openai", "https://api.openai.com/v1/models", "OPENAI_API_KEY"),
        ("anthropic", "https://api.anthropic.com/v1/models", "ANTHROPIC_API_KEY"),
        ("google", "https://generativelanguage.googleapis.com/v1beta/models", "GOOGLE_API_KEY"),
        ("groq", "https://api.groq.com/openai/v1/models", "GROQ_API_KEY"),
    ]
    .into_iter()
    .map(|(name, url, key)| ProviderConfig {
        name: name.to_string(),
        health_url: url.to_string(),
        api_key_env: Some(key.to_string()),
    })
    .collect()
}

/// Providers a user has configured credentials for.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct UserCredentialsConfig {
    pub user_id: String,
    pub providers: Vec<String>,
}

/// Operation record storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON snapshot file loaded at start and written at shutdown.
    pub persistence_path: Option<PathBuf>,

    /// Records kept per provider.
    pub retention_per_provider: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            persistence_path: None,
            retention_per_provider: 1000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,

    /// Request timeout for admin calls in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
            request_timeout_secs: 10,
        }
    }
}
