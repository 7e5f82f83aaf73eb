use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::{session_id_or_new, SESSION_HEADER};
use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))?;
    let message = payload
        .message
        .ok_or_else(|| ApiError::BadRequest("No message provided".to_string()))?;
    let message = message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".to_string()));
    }

    let session_id = session_id_or_new(&headers);
    let session = state.sessions.get(&session_id).await.ok_or_else(|| {
        ApiError::BadRequest(
            "RAG system not initialized. Please upload a CSV file first.".to_string(),
        )
    })?;

    let outcome = session.answer(message).await;
    Ok((
        [(SESSION_HEADER, session_id)],
        Json(json!({
            "success": outcome.success,
            "response": outcome.response,
            "question": outcome.question,
            "mode": outcome.mode,
            "sources": outcome.sources,
        })),
    ))
}
