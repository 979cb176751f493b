//! Provider identity and the collaborators the core consumes.
//!
//! # Data Flow
//! ```text
//! Inbound operation (user_id, operation type)
//!     → credentials.rs (which providers has this user configured?)
//!     → selection (rank configured providers by health)
//!     → caller-supplied callback talks to the chosen provider
//!
//! Health probe loop
//!     → connectivity.rs (can this provider be reached at all?)
//! ```
//!
//! # Design Decisions
//! - Providers are a small fixed set named in config; order = priority
//! - The core never sees credential values, only their presence
//! - What an operation does is opaque to the core

pub mod connectivity;
pub mod credentials;

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

pub use connectivity::{ConnectivityCheck, ConnectivityReport, HttpConnectivityCheck};
pub use credentials::{CredentialStore, InMemoryCredentialStore};

/// Name of one external AI completion provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for ProviderId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for ProviderId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Category of AI operation being brokered.
///
/// The category picks the shape of the degraded payload when every
/// provider fails, so callers can consume fallback results unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationType {
    Chat,
    PortfolioAnalysis,
    MarketSentiment,
    RiskAssessment,
    Custom(String),
}

impl OperationType {
    pub fn as_str(&self) -> &str {
        match self {
            OperationType::Chat => "chat",
            OperationType::PortfolioAnalysis => "portfolio_analysis",
            OperationType::MarketSentiment => "market_sentiment",
            OperationType::RiskAssessment => "risk_assessment",
            OperationType::Custom(name) => name,
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for OperationType {
    fn from(name: &str) -> Self {
        match name {
            "chat" => OperationType::Chat,
            "portfolio_analysis" => OperationType::PortfolioAnalysis,
            "market_sentiment" => OperationType::MarketSentiment,
            "risk_assessment" => OperationType::RiskAssessment,
            other => OperationType::Custom(other.to_string()),
        }
    }
}

impl From<String> for OperationType {
    fn from(name: String) -> Self {
        OperationType::from(name.as_str())
    }
}

impl From<OperationType> for String {
    fn from(op: OperationType) -> Self {
        op.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_type_names() {
        assert_eq!(OperationType::from("chat"), OperationType::Chat);
        assert_eq!(OperationType::from("risk_assessment"), OperationType::RiskAssessment);
        assert_eq!(
            OperationType::from("summarize"),
            OperationType::Custom("summarize".into())
        );
        assert_eq!(OperationType::PortfolioAnalysis.to_string(), "portfolio_analysis");
    }

    #[test]
    fn test_operation_type_serde_as_string() {
        let json = serde_json::to_string(&OperationType::MarketSentiment).unwrap();
        assert_eq!(json, "\"market_sentiment\"");
        let parsed: OperationType = serde_json::from_str("\"translate\"").unwrap();
        assert_eq!(parsed, OperationType::Custom("translate".into()));
    }

    #[test]
    fn test_provider_id_display() {
        let id = ProviderId::from("openai");
        assert_eq!(id.to_string(), "openai");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"openai\"");
    }
}
