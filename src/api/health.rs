//! Health endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use super::state::AppState;

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// GET /live
pub async fn live_check() -> impl IntoResponse {
    Json(json!({"status": "alive"}))
}

/// GET /ready - verifies the stores are reachable
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.query_service.stats().await {
        Ok(_) => (StatusCode::OK, Json(json!({"status": "ready"}))),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "not ready", "reason": e.to_string()})),
        ),
    }
}
