//! Health, config and runtime status routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(get_health))
        .route("/config", get(get_config))
        .route("/status", get(get_status))
}

/// GET /api/health
async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/config: effective process configuration.
async fn get_config(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "port": state.config.port,
        "orchestration": state.orchestrator.config(),
        "platform": std::env::consts::OS,
        "arch": std::env::consts::ARCH,
    }))
}

/// GET /api/status: pool occupancy.
async fn get_status(State(state): State<Arc<AppState>>) -> Json<dualsource_runtime::RuntimeStatus> {
    Json(state.orchestrator.status())
}
