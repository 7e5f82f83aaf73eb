use std::sync::Arc;

use axum::extract::State;
use axum::http::Uri;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "status": "healthy",
        "message": "Vehicle Mapping RAG service is running",
        "embedding_provider": state.providers.embedder.name(),
        "generation_provider": state.providers.generator.name(),
        "active_sessions": state.sessions.len().await,
        "started_at": state.started_at,
    }))
}

pub async fn not_found(uri: Uri) -> ApiError {
    tracing::debug!("No route for {}", uri.path());
    ApiError::NotFound("Endpoint not found".to_string())
}
