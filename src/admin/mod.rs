//! Operator HTTP API.
//!
//! # Routes
//! ```text
//! GET  /admin/status                      → full status report
//! GET  /admin/providers                   → health views, priority order
//! GET  /admin/providers/{provider}        → one health view
//! POST /admin/providers/{provider}/status → force status {"status": "failed"}
//! POST /admin/monitoring/start            → start the probe loop
//! POST /admin/monitoring/stop             → stop the probe loop
//! POST /admin/monitoring/probe            → run one probe round now
//! PUT  /admin/degraded-mode               → {"enabled": bool}
//! ```
//!
//! Every route requires `Authorization: Bearer <admin.api_key>`.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::AdminConfig;
use crate::service::FailoverService;

use self::auth::require_api_key;
use self::handlers::*;

#[derive(Clone)]
pub struct AdminState {
    pub service: Arc<FailoverService>,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(service: Arc<FailoverService>, config: &AdminConfig) -> Self {
        Self {
            service,
            api_key: Arc::from(config.api_key.as_str()),
        }
    }
}

pub fn admin_router(state: AdminState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/providers", get(list_providers))
        .route("/admin/providers/{provider}", get(get_provider))
        .route("/admin/providers/{provider}/status", post(force_status))
        .route("/admin/monitoring/start", post(start_monitoring))
        .route("/admin/monitoring/stop", post(stop_monitoring))
        .route("/admin/monitoring/probe", post(probe_now))
        .route("/admin/degraded-mode", put(set_degraded_mode))
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
