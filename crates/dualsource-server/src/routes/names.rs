//! Name resolution route.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use dualsource_core::{ItemSet, ResolvedSet};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/names", post(resolve_names))
}

#[derive(Debug, Deserialize)]
pub struct NamesRequest {
    #[serde(default)]
    pub names: Option<ItemSet>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NamesResponse {
    pub names: ResolvedSet,
}

/// POST /api/names: resolve a set of names.
///
/// 204 when there is nothing to resolve, 200 with the resolved subset
/// otherwise, 500 if the orchestration itself failed.
async fn resolve_names(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NamesRequest>,
) -> Response {
    let names = match req.names {
        Some(names) if !names.is_empty() => names,
        _ => return StatusCode::NO_CONTENT.into_response(),
    };

    match state.orchestrator.resolve(names).await {
        Ok(resolved) => (StatusCode::OK, Json(NamesResponse { names: resolved })).into_response(),
        Err(e) => {
            error!("Failed to resolve names: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Internal error" })),
            )
                .into_response()
        }
    }
}
