//! Topic administration endpoints

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::info;

use super::state::AppState;
use super::types::ApiError;
use crate::domain::topic::TopicId;

/// GET /topics/{id}
pub async fn get_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let topic_id = TopicId::new(&id);

    let topic = state
        .query_service
        .topic(&topic_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("Topic '{}' not found", id)))?;

    Ok(Json(json!({
        "topic": topic.id().as_str(),
        "payload": topic.payload(),
        "created_at": topic.created_at(),
        "expires_at": topic.expires_at(),
    })))
}

/// DELETE /topics/{id}
pub async fn delete_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let topic_id = TopicId::new(&id);

    let removed = state
        .query_service
        .invalidate_topic(&topic_id)
        .await
        .map_err(ApiError::from)?;

    if !removed {
        return Err(ApiError::not_found(format!("Topic '{}' not found", id)));
    }

    info!(topic = %id, "topic invalidated");

    Ok(Json(json!({"deleted": id})))
}

/// GET /topics/{id}/aliases
pub async fn get_topic_aliases(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let topic_id = TopicId::new(&id);

    let aliases = state
        .query_service
        .topic_aliases(&topic_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(json!({"topic": id, "aliases": aliases})))
}

/// GET /stats
pub async fn get_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.query_service.stats().await.map_err(ApiError::from)?;

    Ok(Json(stats))
}
