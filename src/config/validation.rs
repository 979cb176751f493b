//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (credentials reference known providers)
//! - Validate value ranges (thresholds, timeouts and windows > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    MustBePositive { field: &'static str },

    #[error("at least one provider must be configured")]
    NoProviders,

    #[error("duplicate provider '{0}'")]
    DuplicateProvider(String),

    #[error("provider '{name}' has invalid health_url '{url}'")]
    InvalidHealthUrl { name: String, url: String },

    #[error("credentials for user '{user_id}' reference unknown provider '{provider}'")]
    UnknownCredentialProvider { user_id: String, provider: String },

    #[error("log_format must be 'pretty' or 'json', got '{0}'")]
    InvalidLogFormat(String),
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let positive: [(&'static str, u64); 7] = [
        ("failover.failure_threshold", config.failover.failure_threshold as u64),
        ("failover.attempt_timeout_secs", config.failover.attempt_timeout_secs),
        ("failover.success_rate_window", config.failover.success_rate_window as u64),
        ("health_check.interval_secs", config.health_check.interval_secs),
        ("health_check.timeout_secs", config.health_check.timeout_secs),
        ("store.retention_per_provider", config.store.retention_per_provider as u64),
        ("admin.request_timeout_secs", config.admin.request_timeout_secs),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::MustBePositive { field });
        }
    }

    if config.providers.is_empty() {
        errors.push(ValidationError::NoProviders);
    }

    let mut seen = HashSet::new();
    for provider in &config.providers {
        if !seen.insert(provider.name.as_str()) {
            errors.push(ValidationError::DuplicateProvider(provider.name.clone()));
        }
        let valid_url = Url::parse(&provider.health_url)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid_url {
            errors.push(ValidationError::InvalidHealthUrl {
                name: provider.name.clone(),
                url: provider.health_url.clone(),
            });
        }
    }

    for entry in &config.credentials {
        for provider in &entry.providers {
            if !seen.contains(provider.as_str()) {
                errors.push(ValidationError::UnknownCredentialProvider {
                    user_id: entry.user_id.clone(),
                    provider: provider.clone(),
                });
            }
        }
    }

    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::InvalidLogFormat(
            config.observability.log_format.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ProviderConfig, UserCredentialsConfig};

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.failover.failure_threshold = 0;
        config.health_check.timeout_secs = 0;
        config.providers.push(ProviderConfig {
            name: "openai".into(),
            health_url: "ftp://nope".into(),
            api_key_env: None,
        });
        config.credentials.push(UserCredentialsConfig {
            user_id: "alice".into(),
            providers: vec!["mystery".into()],
        });
        config.observability.log_format = "xml".into();

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::MustBePositive {
            field: "failover.failure_threshold"
        }));
        assert!(errors.contains(&ValidationError::MustBePositive {
            field: "health_check.timeout_secs"
        }));
        assert!(errors.contains(&ValidationError::DuplicateProvider("openai".into())));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidHealthUrl { .. })));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::UnknownCredentialProvider { .. })));
        assert!(errors.contains(&ValidationError::InvalidLogFormat("xml".into())));
    }

    #[test]
    fn test_no_providers() {
        let mut config = AppConfig::default();
        config.providers.clear();
        assert_eq!(validate_config(&config), Err(vec![ValidationError::NoProviders]));
    }
}
