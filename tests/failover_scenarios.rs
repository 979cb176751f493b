//! End-to-end failover behavior through the public service API.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use provider_failover::config::FailoverSettings;
use provider_failover::events::OperationStore;
use provider_failover::provider::InMemoryCredentialStore;
use provider_failover::resilience::{CircuitState, FailoverReason};
use provider_failover::{
    Collaborators, Exhaustion, FailoverError, FailoverService, OperationType, OutcomeKind, ProviderId,
    ProviderStatus,
};

mod common;
use common::{harness, quiet_health_config, BrokenStore, ScriptedConnectivity, PROVIDERS};

fn ids(names: &[&str]) -> Vec<ProviderId> {
    names.iter().map(|n| ProviderId::from(*n)).collect()
}

#[tokio::test(start_paused = true)]
async fn test_failover_to_third_provider() {
    let h = harness(FailoverSettings::default(), quiet_health_config());
    h.configure("alice", &["openai", "anthropic", "google"]);

    let outcome = h
        .service
        .execute_with_failover("alice", OperationType::Chat, |provider, _user| async move {
            if provider.as_str() == "google" {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(json!({ "content": "hello from google" }))
            } else {
                Err(format!("network error: connection refused by {}", provider))
            }
        })
        .await
        .unwrap();

    assert_eq!(outcome.provider_used, Some(ProviderId::from("google")));
    assert!(outcome.failover_attempted);
    assert!(!outcome.fallback_used);
    assert_eq!(outcome.kind(), OutcomeKind::FailoverSuccess);
    assert_eq!(outcome.attempted_providers, ids(&["openai", "anthropic", "google"]));
    assert_eq!(outcome.data["content"], "hello from google");

    let google = h.service.provider_health(&"google".into()).unwrap();
    assert_eq!(google.status, ProviderStatus::Healthy);
    let latency = google.response_time_ms.unwrap();
    assert!((50..60).contains(&latency), "latency {latency}");

    let openai = h.service.provider_health(&"openai".into()).unwrap();
    assert_eq!(openai.status, ProviderStatus::Degraded);
    assert_eq!(openai.consecutive_failures, 1);
    assert_eq!(openai.success_rate, 0.0);

    let report = h.service.provider_status();
    let events = &report.recent_failover_events;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].from_provider.as_str(), "openai");
    assert_eq!(events[0].to_provider, Some(ProviderId::from("anthropic")));
    assert_eq!(events[1].to_provider, Some(ProviderId::from("google")));
    assert!(events.iter().all(|e| e.reason == FailoverReason::NetworkError));
    assert_eq!(h.store.total_records(), 3);
}

#[tokio::test]
async fn test_first_candidate_success_is_plain() {
    let h = harness(FailoverSettings::default(), quiet_health_config());
    h.configure("alice", &["anthropic", "groq"]);

    let outcome = h
        .service
        .execute_with_failover("alice", OperationType::MarketSentiment, |provider, user| async move {
            Ok::<Value, String>(json!({ "provider": provider.as_str(), "user": user }))
        })
        .await
        .unwrap();

    assert_eq!(outcome.kind(), OutcomeKind::Success);
    assert!(!outcome.failover_attempted);
    assert_eq!(outcome.attempted_providers, ids(&["anthropic"]));
    assert_eq!(outcome.data["user"], "alice");
    assert!(h.service.provider_status().recent_failover_events.is_empty());
}

#[tokio::test]
async fn test_all_breakers_open_serves_fallback_without_attempts() {
    let h = harness(FailoverSettings::default(), quiet_health_config());
    h.configure("alice", &["openai", "groq"]);
    for provider in ["openai", "groq"] {
        h.service
            .force_provider_status(&provider.into(), ProviderStatus::Failed)
            .unwrap();
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let outcome = h
        .service
        .execute_with_failover("alice", OperationType::PortfolioAnalysis, move |_provider, _user| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<Value, String>(json!({})) }
        })
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(outcome.fallback_used);
    assert!(outcome.attempted_providers.is_empty());
    assert_eq!(outcome.provider_used, None);
    assert_eq!(outcome.exhaustion, Some(Exhaustion::NoEligibleProvider));
    assert_eq!(outcome.kind(), OutcomeKind::Degraded);
    assert_eq!(outcome.data["fallback"], true);
    assert!(outcome.data.get("recommendations").is_some());
    assert_eq!(h.store.total_records(), 0);
    assert!(h.service.provider_status().recent_failover_events.is_empty());
}

#[tokio::test]
async fn test_user_without_credentials_gets_fallback() {
    let h = harness(FailoverSettings::default(), quiet_health_config());
    h.credentials.set_credential("bob", "openai".into(), false);

    let outcome = h
        .service
        .execute_with_failover("bob", OperationType::Chat, |_provider, _user| async {
            Ok::<Value, String>(json!({}))
        })
        .await
        .unwrap();

    assert_eq!(outcome.exhaustion, Some(Exhaustion::NoEligibleProvider));
    assert!(outcome.fallback_reason.unwrap().contains("No eligible provider"));
    assert_eq!(h.service.select_best("bob", &OperationType::Chat), None);
}

#[tokio::test]
async fn test_failed_after_third_consecutive_failure() {
    let h = harness(FailoverSettings::default(), quiet_health_config());
    h.configure("alice", &["openai"]);
    let openai = ProviderId::from("openai");

    for expected in [ProviderStatus::Degraded, ProviderStatus::Degraded, ProviderStatus::Failed] {
        let outcome = h
            .service
            .execute_with_failover("alice", OperationType::Chat, |_provider, _user| async {
                Err::<Value, _>("upstream returned 500")
            })
            .await
            .unwrap();
        assert_eq!(outcome.attempted_providers, vec![openai.clone()]);
        assert_eq!(outcome.exhaustion, Some(Exhaustion::AllProvidersFailed));
        assert!(outcome.fallback_reason.unwrap().contains("upstream returned 500"));

        let health = h.service.provider_health(&openai).unwrap();
        assert_eq!(health.status, expected);
    }

    let health = h.service.provider_health(&openai).unwrap();
    assert!(!health.is_available);
    assert_eq!(health.circuit_state, CircuitState::Open);
    assert!(h.service.candidates("alice", &OperationType::Chat).is_empty());
}

#[tokio::test]
async fn test_hard_error_when_degraded_mode_disabled() {
    let settings = FailoverSettings {
        degraded_mode_enabled: false,
        ..FailoverSettings::default()
    };
    let h = harness(settings, quiet_health_config());
    h.configure("alice", &PROVIDERS);

    let err = h
        .service
        .execute_with_failover("alice", OperationType::RiskAssessment, |_provider, _user| async {
            Err::<Value, _>("429 rate limit exceeded")
        })
        .await
        .unwrap_err();

    assert_eq!(err.attempted_providers(), ids(&PROVIDERS).as_slice());
    assert!(!err.fallback_available());
    assert_eq!(err.exhaustion(), Exhaustion::AllProvidersFailed);
    assert_eq!(err.last_error(), Some("429 rate limit exceeded"));

    let events = h.service.provider_status().recent_failover_events;
    assert_eq!(events.len(), 4);
    assert!(events.iter().all(|e| e.reason == FailoverReason::RateLimit));
    assert_eq!(events[3].to_provider, None);
}

#[tokio::test]
async fn test_no_eligible_provider_hard_error() {
    let h = harness(FailoverSettings::default(), quiet_health_config());
    h.service.set_degraded_mode(false);
    assert!(!h.service.degraded_mode_enabled());

    let err = h
        .service
        .execute_with_failover("nobody", OperationType::Chat, |_provider, _user| async {
            Ok::<Value, String>(json!({}))
        })
        .await
        .unwrap_err();

    assert!(matches!(err, FailoverError::NoEligibleProvider { .. }));
    assert!(err.attempted_providers().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_hanging_provider_times_out_and_fails_over() {
    let settings = FailoverSettings {
        attempt_timeout_secs: 30,
        ..FailoverSettings::default()
    };
    let h = harness(settings, quiet_health_config());
    h.configure("alice", &["openai", "anthropic"]);

    let outcome = h
        .service
        .execute_with_failover("alice", OperationType::Chat, |provider, _user| async move {
            if provider.as_str() == "openai" {
                std::future::pending::<()>().await;
            }
            Ok::<Value, String>(json!({ "content": "ok" }))
        })
        .await
        .unwrap();

    assert_eq!(outcome.provider_used, Some(ProviderId::from("anthropic")));
    let events = h.service.provider_status().recent_failover_events;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reason, FailoverReason::Timeout);

    let openai = h.service.provider_health(&"openai".into()).unwrap();
    assert_eq!(openai.last_error.as_deref(), Some("attempt timed out after 30000ms"));
}

#[tokio::test(start_paused = true)]
async fn test_open_breaker_reopens_for_trial_after_cooldown() {
    let h = harness(FailoverSettings::default(), quiet_health_config());
    h.configure("alice", &["openai", "groq"]);
    let openai = ProviderId::from("openai");
    h.service.force_provider_status(&openai, ProviderStatus::Failed).unwrap();

    assert_eq!(h.service.candidates("alice", &OperationType::Chat), ids(&["groq"]));

    tokio::time::advance(Duration::from_secs(899)).await;
    assert_eq!(h.service.candidates("alice", &OperationType::Chat), ids(&["groq"]));

    tokio::time::advance(Duration::from_secs(2)).await;
    assert_eq!(
        h.service.provider_health(&openai).unwrap().circuit_state,
        CircuitState::HalfOpen
    );
    // Groq is untried (UNKNOWN) and openai is FAILED, so neither is HEALTHY.
    assert_eq!(h.service.candidates("alice", &OperationType::Chat), ids(&["openai", "groq"]));

    let outcome = h
        .service
        .execute_with_failover("alice", OperationType::Chat, |_provider, _user| async {
            Ok::<Value, String>(json!({ "content": "back" }))
        })
        .await
        .unwrap();
    assert_eq!(outcome.provider_used, Some(openai.clone()));

    let health = h.service.provider_health(&openai).unwrap();
    assert_eq!(health.status, ProviderStatus::Healthy);
    assert_eq!(health.circuit_state, CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_failed_trial_keeps_breaker_open() {
    let h = harness(FailoverSettings::default(), quiet_health_config());
    h.configure("alice", &["openai"]);
    let openai = ProviderId::from("openai");
    for _ in 0..3 {
        h.service
            .execute_with_failover("alice", OperationType::Chat, |_p, _u| async { Err::<Value, _>("boom") })
            .await
            .unwrap();
    }
    assert!(h.service.candidates("alice", &OperationType::Chat).is_empty());

    tokio::time::advance(Duration::from_secs(901)).await;
    let outcome = h
        .service
        .execute_with_failover("alice", OperationType::Chat, |_p, _u| async { Err::<Value, _>("still down") })
        .await
        .unwrap();
    assert_eq!(outcome.attempted_providers, vec![openai.clone()]);

    let health = h.service.provider_health(&openai).unwrap();
    assert_eq!(health.consecutive_failures, 4);
    assert_eq!(health.circuit_state, CircuitState::Open);
    assert!(h.service.candidates("alice", &OperationType::Chat).is_empty());
}

#[tokio::test]
async fn test_ranking_prefers_healthy_after_failover() {
    let h = harness(FailoverSettings::default(), quiet_health_config());
    h.configure("alice", &["openai", "anthropic", "google"]);

    h.service
        .execute_with_failover("alice", OperationType::Chat, |provider, _user| async move {
            if provider.as_str() == "google" {
                Ok(json!({}))
            } else {
                Err("connection reset")
            }
        })
        .await
        .unwrap();

    assert_eq!(
        h.service.candidates("alice", &OperationType::Chat),
        ids(&["google", "openai", "anthropic"])
    );
    assert_eq!(
        h.service.select_best("alice", &OperationType::Chat),
        Some(ProviderId::from("google"))
    );
}

#[tokio::test]
async fn test_bookkeeping_failures_do_not_mask_results() {
    let credentials = InMemoryCredentialStore::new();
    credentials.set_credential("alice", "openai".into(), true);
    credentials.set_credential("alice", "groq".into(), true);
    let collaborators = Collaborators::new(
        Arc::new(credentials),
        Arc::new(ScriptedConnectivity::default()),
        Arc::new(BrokenStore),
    );
    let service = FailoverService::from_parts(
        ids(&PROVIDERS),
        FailoverSettings::default(),
        quiet_health_config(),
        collaborators,
    );

    let outcome = service
        .execute_with_failover("alice", OperationType::Chat, |provider, _user| async move {
            if provider.as_str() == "openai" {
                Err("invalid response: truncated JSON")
            } else {
                Ok(json!({ "content": "served" }))
            }
        })
        .await
        .unwrap();

    assert_eq!(outcome.provider_used, Some(ProviderId::from("groq")));
    assert_eq!(outcome.data["content"], "served");

    let events = service.provider_status().recent_failover_events;
    assert_eq!(events[0].reason, FailoverReason::InvalidResponse);
    let groq = service.provider_health(&"groq".into()).unwrap();
    assert_eq!(groq.status, ProviderStatus::Healthy);
    assert_eq!(groq.success_rate, 1.0);
}

#[tokio::test]
async fn test_event_buffer_keeps_most_recent() {
    let settings = FailoverSettings {
        event_buffer_size: 3,
        failure_threshold: 100,
        ..FailoverSettings::default()
    };
    let h = harness(settings, quiet_health_config());
    h.configure("alice", &["openai", "anthropic"]);

    for _ in 0..3 {
        h.service
            .execute_with_failover("alice", OperationType::Custom("summarize".into()), |_p, _u| async {
                Err::<Value, _>("api error")
            })
            .await
            .unwrap();
    }

    let events = h.service.provider_status().recent_failover_events;
    assert_eq!(events.len(), 3);
    assert!(events
        .iter()
        .all(|e| e.operation_type == OperationType::Custom("summarize".into())));
    assert_eq!(events[0].reason, FailoverReason::ApiError);
}

#[tokio::test]
async fn test_operation_records_carry_outcome() {
    let h = harness(FailoverSettings::default(), quiet_health_config());
    h.configure("alice", &["openai", "anthropic"]);

    h.service
        .execute_with_failover("alice", OperationType::Chat, |provider, _user| async move {
            if provider.as_str() == "openai" {
                Err("quota exceeded for this month")
            } else {
                Ok(json!({}))
            }
        })
        .await
        .unwrap();

    let openai = h.store.recent(&"openai".into(), 10).unwrap();
    assert_eq!(openai.len(), 1);
    assert!(!openai[0].success);
    assert_eq!(openai[0].error_message.as_deref(), Some("quota exceeded for this month"));
    assert_eq!(openai[0].user_id, "alice");

    let anthropic = h.store.recent(&"anthropic".into(), 10).unwrap();
    assert!(anthropic[0].success);
    let events = h.service.provider_status().recent_failover_events;
    assert_eq!(events[0].reason, FailoverReason::QuotaExceeded);
}
