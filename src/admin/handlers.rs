use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::admin::AdminState;
use crate::health::{HealthError, ProviderHealthView, ProviderStatus};
use crate::provider::ProviderId;
use crate::service::ProviderStatusReport;

#[derive(Debug)]
pub enum AdminError {
    UnknownProvider(ProviderId),
    BadRequest(String),
}

impl From<HealthError> for AdminError {
    fn from(e: HealthError) -> Self {
        match e {
            HealthError::UnknownProvider(provider) => AdminError::UnknownProvider(provider),
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AdminError::UnknownProvider(p) => (StatusCode::NOT_FOUND, format!("unknown provider '{}'", p)),
            AdminError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ForceStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ForceStatusResponse {
    pub provider: ProviderId,
    pub previous: ProviderStatus,
    pub current: ProviderStatus,
}

#[derive(Debug, Deserialize)]
pub struct DegradedModeRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct MonitoringResponse {
    pub changed: bool,
    pub active: bool,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<ProviderStatusReport> {
    Json(state.service.provider_status())
}

pub async fn list_providers(State(state): State<AdminState>) -> Json<Vec<ProviderHealthView>> {
    let report = state.service.provider_status();
    let mut providers = report.providers;
    Json(report.priority.iter().filter_map(|p| providers.remove(p)).collect())
}

pub async fn get_provider(
    State(state): State<AdminState>,
    Path(provider): Path<String>,
) -> Result<Json<ProviderHealthView>, AdminError> {
    let provider = ProviderId::from(provider);
    state
        .service
        .provider_health(&provider)
        .map(Json)
        .ok_or(AdminError::UnknownProvider(provider))
}

pub async fn force_status(
    State(state): State<AdminState>,
    Path(provider): Path<String>,
    Json(body): Json<ForceStatusRequest>,
) -> Result<Json<ForceStatusResponse>, AdminError> {
    let status: ProviderStatus = body.status.parse().map_err(AdminError::BadRequest)?;
    let provider = ProviderId::from(provider);
    let previous = state.service.force_provider_status(&provider, status)?;
    Ok(Json(ForceStatusResponse {
        provider,
        previous,
        current: status,
    }))
}

pub async fn start_monitoring(State(state): State<AdminState>) -> Json<MonitoringResponse> {
    let changed = state.service.start_health_monitoring();
    Json(MonitoringResponse {
        changed,
        active: state.service.health_monitoring_active(),
    })
}

pub async fn stop_monitoring(State(state): State<AdminState>) -> Json<MonitoringResponse> {
    let was_active = state.service.health_monitoring_active();
    state.service.stop_health_monitoring().await;
    Json(MonitoringResponse {
        changed: was_active,
        active: state.service.health_monitoring_active(),
    })
}

pub async fn probe_now(State(state): State<AdminState>) -> Json<Vec<ProviderHealthView>> {
    state.service.probe_now().await;
    list_providers(State(state)).await
}

pub async fn set_degraded_mode(
    State(state): State<AdminState>,
    Json(body): Json<DegradedModeRequest>,
) -> Json<serde_json::Value> {
    state.service.set_degraded_mode(body.enabled);
    Json(json!({ "degraded_mode_enabled": state.service.degraded_mode_enabled() }))
}
