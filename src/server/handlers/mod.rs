use axum::http::HeaderMap;

pub mod chat;
pub mod health;
pub mod sessions;
pub mod upload;

/// Header that carries the client's session id in both directions.
pub const SESSION_HEADER: &str = "x-session-id";

/// Session id supplied by the client, if any.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty() && value.len() <= 128)
        .map(str::to_string)
}

/// The client's session id, or a freshly issued one.
pub fn session_id_or_new(headers: &HeaderMap) -> String {
    session_id(headers).unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string())
}
