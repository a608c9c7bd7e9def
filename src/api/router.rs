use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::health;
use super::query;
use super::state::AppState;
use super::topics;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .route("/ready", get(health::ready_check))
        .route("/query", post(query::handle_query))
        .route(
            "/topics/{id}",
            get(topics::get_topic).delete(topics::delete_topic),
        )
        .route("/topics/{id}/aliases", get(topics::get_topic_aliases))
        .route("/stats", get(topics::get_stats))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
