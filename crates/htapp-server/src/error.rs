//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Listening socket could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Nothing to serve at the requested path.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Document could not be transformed.
    #[error("Transform error: {0}")]
    Transform(#[from] htapp_html::TransformError),

    /// Blocking task failed.
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Map a filesystem error for `path`, treating a missing file as 404.
    pub(crate) fn from_io(e: std::io::Error, path: &str) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path.to_owned())
        } else {
            Self::Io(e)
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::NotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Not found", "path": path}),
            ),
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                json!({"error": message}),
            ),
            Self::Bind { .. } | Self::Transform(_) | Self::Internal(_) | Self::Io(_) => {
                tracing::error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": self.to_string()}),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
