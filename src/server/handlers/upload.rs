use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use super::{session_id_or_new, SESSION_HEADER};
use crate::core::errors::ApiError;
use crate::rag::RawTable;
use crate::state::error::InitializationError;
use crate::state::{AppState, RagSession};

const FILE_FIELD: &str = "file";

/// Accept a CSV upload and build a fresh session corpus from it.
///
/// The file is parsed in memory; nothing is written to disk.
pub async fn upload_csv(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let max_bytes = state.config.server.max_upload_bytes;
    let too_large = || {
        ApiError::PayloadTooLarge(format!(
            "File size exceeds maximum limit ({}MB)",
            max_bytes / (1024 * 1024)
        ))
    };

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(e, &too_large))? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().trim().to_string();
        let data = field.bytes().await.map_err(|e| multipart_error(e, &too_large))?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;
    if filename.is_empty() {
        return Err(ApiError::BadRequest("No file selected".to_string()));
    }
    if !has_csv_extension(&filename) {
        return Err(ApiError::BadRequest(
            "Invalid file type. Please upload a CSV file.".to_string(),
        ));
    }
    if data.len() > max_bytes {
        return Err(too_large());
    }

    let filename = sanitize_filename(&filename);
    let session_id = session_id_or_new(&headers);
    let table = match RawTable::from_reader(data.as_ref()) {
        Ok(table) => table,
        Err(e) => {
            discard_session(&state, &session_id).await;
            return Err(e.into());
        }
    };
    tracing::info!(
        "Building session {} from {} ({} rows)",
        session_id,
        filename,
        table.len()
    );

    let session = match RagSession::initialize(&table, filename.clone(), &state.config, &state.providers).await {
        Ok(session) => session,
        Err(InitializationError::Aggregation(e)) => {
            discard_session(&state, &session_id).await;
            return Err(e.into());
        }
        Err(e) => {
            discard_session(&state, &session_id).await;
            tracing::error!("Failed to initialize session {}: {}", session_id, e);
            return Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                [(SESSION_HEADER, session_id)],
                Json(json!({
                    "success": false,
                    "error": "Failed to build the vehicle knowledge base",
                    "message": "Error processing upload. Check that the embedding service is running.",
                })),
            ));
        }
    };

    let vehicle_count = session.vehicle_count();
    if let Some(previous) = state.sessions.install(&session_id, session).await {
        tracing::info!("Replaced session built from {}", previous.source_name());
    }

    Ok((
        StatusCode::OK,
        [(SESSION_HEADER, session_id)],
        Json(json!({
            "success": true,
            "vehicle_count": vehicle_count,
            "filename": filename,
            "message": format!("Loaded {} vehicles from {}", vehicle_count, filename),
        })),
    ))
}

/// A failed load leaves the client without a corpus rather than the previous one.
async fn discard_session(state: &AppState, session_id: &str) {
    if let Some(previous) = state.sessions.remove(session_id).await {
        tracing::info!(
            "Dropped session built from {} after failed upload",
            previous.source_name()
        );
    }
}

fn multipart_error(err: MultipartError, too_large: &impl Fn() -> ApiError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return too_large();
    }
    ApiError::BadRequest(format!("Invalid upload: {}", err.body_text()))
}

fn has_csv_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("csv"))
}

/// Keep only the final path component and a conservative character set.
fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(&['/', '\\'][..])
        .next()
        .unwrap_or(filename);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_extension_is_case_insensitive() {
        assert!(has_csv_extension("mapping.csv"));
        assert!(has_csv_extension("MAPPING.CSV"));
        assert!(!has_csv_extension("mapping.xlsx"));
        assert!(!has_csv_extension("csv"));
    }

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd.csv"), "passwd.csv");
        assert_eq!(sanitize_filename("C:\\data\\my file.csv"), "my_file.csv");
        assert_eq!(sanitize_filename(".hidden.csv"), "hidden.csv");
    }
}
