//! Request handlers and the error-to-response boundary

use axum::extract::{Form, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::error::Error as _;
use std::path::Path;

use crate::error::{ErrorKind, HrqaError};
use crate::retrieval::Answer;
use crate::service::AppState;

const UPLOAD_FIELD: &str = "file";
const FALLBACK_FILE_NAME: &str = "upload.pdf";

/// Any failure that reaches a handler, rendered as a JSON error payload
#[derive(Debug)]
pub struct ApiError(pub HrqaError);

impl<E> From<E> for ApiError
where
    E: Into<HrqaError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Input => StatusCode::BAD_REQUEST,
        ErrorKind::External => StatusCode::BAD_GATEWAY,
        ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Config | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = status_for(kind);

        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", kind.as_str(), self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }

        let body = json!({
            "status": "error",
            "kind": kind.as_str(),
            "message": self.0.to_string(),
            "detail": self.0.source().map(|s| s.to_string()),
        });

        (status, Json(body)).into_response()
    }
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "connected": state.is_connected(),
    }))
}

/// A missing `query` field reads as empty and is rejected as `EmptyQuestion`
#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub query: String,
}

pub async fn ask_question(
    State(state): State<AppState>,
    Form(form): Form<AskForm>,
) -> Result<Json<Answer>, ApiError> {
    let services = state.services()?;
    let answer = services.ask(&form.query).await?;
    Ok(Json(answer))
}

pub async fn upload_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let services = state.services()?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HrqaError::InvalidUpload(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let name = sanitize_file_name(field.file_name().unwrap_or(FALLBACK_FILE_NAME));
        let bytes = field
            .bytes()
            .await
            .map_err(|e| HrqaError::InvalidUpload(e.body_text()))?;
        upload = Some((name, bytes));
        break;
    }

    let (name, bytes) = match upload {
        Some((name, bytes)) if !bytes.is_empty() => (name, bytes),
        _ => return Err(HrqaError::MissingFile.into()),
    };

    let path = state.upload_dir.join(&name);
    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(|e| HrqaError::Io {
            source: e,
            context: format!("Failed to create upload directory: {:?}", state.upload_dir),
        })?;
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| HrqaError::Io {
            source: e,
            context: format!("Failed to save upload: {:?}", path),
        })?;
    tracing::info!("Saved upload {} ({} bytes)", name, bytes.len());

    let report = services.ingest_pdf(&bytes).await?;

    Ok(Json(json!({
        "status": "success",
        "message": format!("Uploaded and processed {} chunks from {}", report.chunks, name),
        "chunks": report.chunks,
        "batches": report.batches,
    })))
}

/// Keep only the final path component, restricted to a safe character set
pub fn sanitize_file_name(raw: &str) -> String {
    let base = Path::new(raw)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

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

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}
