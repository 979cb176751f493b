//! Failure classification.
//!
//! Substring matching on the error description is best-effort, not
//! authoritative. Anything unrecognized is an `ApiError`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a provider attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailoverReason {
    Timeout,
    RateLimit,
    QuotaExceeded,
    NetworkError,
    InvalidResponse,
    ApiError,
    HealthCheckFailed,
}

impl FailoverReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailoverReason::Timeout => "TIMEOUT",
            FailoverReason::RateLimit => "RATE_LIMIT",
            FailoverReason::QuotaExceeded => "QUOTA_EXCEEDED",
            FailoverReason::NetworkError => "NETWORK_ERROR",
            FailoverReason::InvalidResponse => "INVALID_RESPONSE",
            FailoverReason::ApiError => "API_ERROR",
            FailoverReason::HealthCheckFailed => "HEALTH_CHECK_FAILED",
        }
    }
}

impl fmt::Display for FailoverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const TIMEOUT_MARKERS: &[&str] = &["timeout", "timed out", "deadline exceeded"];
const QUOTA_MARKERS: &[&str] = &["quota", "billing", "credit balance", "insufficient_funds"];
const RATE_LIMIT_MARKERS: &[&str] = &["rate limit", "rate_limit", "ratelimit", "too many requests", "429"];
const NETWORK_MARKERS: &[&str] = &[
    "network",
    "connection",
    "connect error",
    "dns",
    "unreachable",
    "refused",
    "reset by peer",
    "broken pipe",
];
const INVALID_RESPONSE_MARKERS: &[&str] = &[
    "invalid response",
    "malformed",
    "unexpected response",
    "parse",
    "decode",
    "deserializ",
    "json",
];

/// Map an error description to exactly one failure reason.
///
/// Never yields `HealthCheckFailed`; that reason belongs to the probe loop.
pub fn classify(error_description: &str) -> FailoverReason {
    let text = error_description.to_lowercase();
    let matches = |markers: &[&str]| markers.iter().any(|m| text.contains(m));

    if matches(TIMEOUT_MARKERS) {
        FailoverReason::Timeout
    } else if matches(QUOTA_MARKERS) {
        FailoverReason::QuotaExceeded
    } else if matches(RATE_LIMIT_MARKERS) {
        FailoverReason::RateLimit
    } else if matches(NETWORK_MARKERS) {
        FailoverReason::NetworkError
    } else if matches(INVALID_RESPONSE_MARKERS) {
        FailoverReason::InvalidResponse
    } else {
        FailoverReason::ApiError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_messages() {
        assert_eq!(classify("request timed out after 30s"), FailoverReason::Timeout);
        assert_eq!(classify("Rate limit reached for gpt-4"), FailoverReason::RateLimit);
        assert_eq!(classify("HTTP 429 Too Many Requests"), FailoverReason::RateLimit);
        assert_eq!(
            classify("You exceeded your current quota, please check your plan"),
            FailoverReason::QuotaExceeded
        );
        assert_eq!(classify("Connection refused (os error 111)"), FailoverReason::NetworkError);
        assert_eq!(classify("failed to parse completion body"), FailoverReason::InvalidResponse);
        assert_eq!(classify("JSON decode error at line 1"), FailoverReason::InvalidResponse);
    }

    #[test]
    fn test_classify_falls_back_to_api_error() {
        assert_eq!(classify("internal server error"), FailoverReason::ApiError);
        assert_eq!(classify(""), FailoverReason::ApiError);
    }

    #[test]
    fn test_quota_wins_over_rate_limit() {
        assert_eq!(
            classify("rate limit: quota exhausted for this month"),
            FailoverReason::QuotaExceeded
        );
    }

    #[test]
    fn test_reason_serializes_screaming_case() {
        let json = serde_json::to_string(&FailoverReason::HealthCheckFailed).unwrap();
        assert_eq!(json, "\"HEALTH_CHECK_FAILED\"");
        assert_eq!(FailoverReason::NetworkError.to_string(), "NETWORK_ERROR");
    }
}
