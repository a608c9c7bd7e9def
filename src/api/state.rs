//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::services::QueryService;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub query_service: Arc<QueryService>,
}

impl AppState {
    pub fn new(query_service: Arc<QueryService>) -> Self {
        Self { query_service }
    }
}
