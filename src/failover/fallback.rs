//! Synthetic results for degraded mode.
//!
//! Every payload carries the same top-level fields a provider response for
//! that operation would, plus `fallback: true` and a `notice` so consumers
//! can flag it without a separate code path.

use serde_json::{json, Value};

use crate::failover::outcome::Exhaustion;
use crate::provider::{OperationType, ProviderId};

/// What the generator knows about the failed execution.
#[derive(Debug, Clone)]
pub struct FallbackContext<'a> {
    pub user_id: &'a str,
    pub operation: &'a OperationType,
    pub attempted_providers: &'a [ProviderId],
    pub last_error: Option<&'a str>,
    pub exhaustion: Exhaustion,
}

impl FallbackContext<'_> {
    /// Human-readable reason, embedding the last observed error.
    pub fn reason(&self) -> String {
        match (self.exhaustion, self.last_error) {
            (Exhaustion::NoEligibleProvider, _) => {
                "No eligible provider is configured or available".to_string()
            }
            (Exhaustion::AllProvidersFailed, Some(error)) => format!(
                "All {} provider(s) failed; last error: {}",
                self.attempted_providers.len(),
                error
            ),
            (Exhaustion::AllProvidersFailed, None) => {
                format!("All {} provider(s) failed", self.attempted_providers.len())
            }
        }
    }
}

pub trait FallbackGenerator: Send + Sync {
    fn generate(&self, ctx: &FallbackContext<'_>) -> Value;
}

/// Conservative, non-personalized payloads per operation type.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFallbackGenerator;

const NOTICE: &str = "AI providers are temporarily unavailable. This is a generic response.";

impl FallbackGenerator for DefaultFallbackGenerator {
    fn generate(&self, ctx: &FallbackContext<'_>) -> Value {
        let reason = ctx.reason();
        let mut payload = match ctx.operation {
            OperationType::Chat => json!({
                "role": "assistant",
                "content": "I'm unable to reach an AI provider right now. Please try again in a few minutes.",
                "model": "fallback",
            }),
            OperationType::PortfolioAnalysis => json!({
                "summary": "Detailed analysis is unavailable. Keep your current allocation and review it once analysis is restored.",
                "overall_score": null,
                "insights": [],
                "recommendations": [
                    "Maintain a diversified allocation",
                    "Avoid large position changes until full analysis is available",
                ],
                "confidence": 0.0,
            }),
            OperationType::MarketSentiment => json!({
                "sentiment": "neutral",
                "score": 0.0,
                "confidence": 0.0,
                "summary": "Sentiment data is unavailable; defaulting to neutral.",
                "sources": [],
            }),
            OperationType::RiskAssessment => json!({
                "risk_level": "unknown",
                "risk_score": null,
                "factors": [],
                "recommendations": ["Treat positions conservatively until a full assessment is available"],
                "summary": "Risk assessment is unavailable.",
            }),
            OperationType::Custom(_) => json!({
                "content": "The requested operation is temporarily unavailable.",
            }),
        };

        if let Value::Object(map) = &mut payload {
            map.insert("fallback".to_string(), Value::Bool(true));
            map.insert("notice".to_string(), Value::String(NOTICE.to_string()));
            map.insert("reason".to_string(), Value::String(reason));
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(operation: &'a OperationType, attempted: &'a [ProviderId], last_error: Option<&'a str>) -> FallbackContext<'a> {
        FallbackContext {
            user_id: "alice",
            operation,
            attempted_providers: attempted,
            last_error,
            exhaustion: if attempted.is_empty() {
                Exhaustion::NoEligibleProvider
            } else {
                Exhaustion::AllProvidersFailed
            },
        }
    }

    #[test]
    fn test_payloads_are_marked() {
        let ops = [
            OperationType::Chat,
            OperationType::PortfolioAnalysis,
            OperationType::MarketSentiment,
            OperationType::RiskAssessment,
            OperationType::Custom("summarize".into()),
        ];
        for op in &ops {
            let payload = DefaultFallbackGenerator.generate(&ctx(op, &[], None));
            assert_eq!(payload["fallback"], true, "{op}");
            assert!(payload["notice"].is_string());
        }
    }

    #[test]
    fn test_sentiment_is_neutral() {
        let payload = DefaultFallbackGenerator.generate(&ctx(&OperationType::MarketSentiment, &[], None));
        assert_eq!(payload["sentiment"], "neutral");
        assert_eq!(payload["score"], 0.0);
    }

    #[test]
    fn test_reason_embeds_last_error() {
        let attempted = vec![ProviderId::from("openai"), ProviderId::from("groq")];
        let context = ctx(&OperationType::Chat, &attempted, Some("HTTP 503"));
        let reason = context.reason();
        assert!(reason.contains("2 provider(s)"));
        assert!(reason.contains("HTTP 503"));

        let payload = DefaultFallbackGenerator.generate(&context);
        assert_eq!(payload["reason"], reason);
        assert_eq!(payload["role"], "assistant");
    }
}
