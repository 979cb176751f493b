//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → FailoverSettings shared via ArcSwap to registry/selector/executor
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of FailoverSettings, health monitor restarted
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The provider set is fixed at process start; reload only retunes

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

use arc_swap::ArcSwap;
use std::sync::Arc;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, AppConfig, FailoverSettings, HealthCheckConfig, ObservabilityConfig, ProviderConfig,
    StoreConfig, UserCredentialsConfig,
};
pub use validation::{validate_config, ValidationError};

/// Failover settings readable lock-free and replaceable on reload.
pub type SharedSettings = Arc<ArcSwap<FailoverSettings>>;

pub fn shared_settings(settings: FailoverSettings) -> SharedSettings {
    Arc::new(ArcSwap::from_pointee(settings))
}
