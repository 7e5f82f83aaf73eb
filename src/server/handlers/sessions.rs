use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use super::{session_id_or_new, SESSION_HEADER};
use crate::state::AppState;

pub async fn status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let session_id = session_id_or_new(&headers);
    let status = match state.sessions.get(&session_id).await {
        Some(session) => {
            let stats = session.stats();
            json!({
                "initialized": true,
                "vehicle_count": stats.vehicle_count,
                "filename": stats.source_name,
                "has_index": true,
                "fragment_count": stats.fragment_count,
                "placeholder": stats.placeholder,
                "created_at": stats.created_at,
            })
        }
        None => json!({
            "initialized": false,
            "vehicle_count": 0,
            "filename": null,
            "has_index": false,
            "fragment_count": 0,
        }),
    };

    (
        [(SESSION_HEADER, session_id)],
        Json(json!({ "success": true, "status": status })),
    )
}

pub async fn reset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let session_id = session_id_or_new(&headers);
    if let Some(session) = state.sessions.remove(&session_id).await {
        match Arc::try_unwrap(session) {
            Ok(session) => session.close(),
            // Still borrowed by an in-flight request; dropped when it finishes.
            Err(session) => tracing::info!("Reset session for {}", session.source_name()),
        }
    }

    (
        [(SESSION_HEADER, session_id)],
        Json(json!({
            "success": true,
            "message": "RAG system reset successfully",
        })),
    )
}
