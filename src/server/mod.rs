//! HTTP surface
//!
//! - `POST /upload_pdf` multipart field `file`
//! - `POST /ask_question` form field `query`
//! - `GET /health`

mod handlers;
mod signals;

pub use handlers::{sanitize_file_name, status_for, ApiError};
pub use signals::{shutdown_signal, SignalHandler};

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::error::{HrqaError, Result};
use crate::service::AppState;

pub fn router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/upload_pdf", post(handlers::upload_pdf))
        .route("/ask_question", post(handlers::ask_question))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until SIGINT/SIGTERM, then drain in-flight requests
pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await.map_err(|e| HrqaError::Io {
        source: e,
        context: format!("Failed to bind {}", addr),
    })?;

    if let Ok(local) = listener.local_addr() {
        tracing::info!("Listening on http://{}", local);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| HrqaError::Io {
            source: e,
            context: "Server error".to_string(),
        })?;

    tracing::info!("Server stopped");
    Ok(())
}
