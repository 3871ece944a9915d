//! Embedded runtime scripts.

use axum::extract::Path;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::ServerError;

/// Handle GET /embed/{path}.
pub(crate) async fn get_embedded(Path(path): Path<String>) -> Result<Response, ServerError> {
    let content = htapp_assets::get(&path).ok_or_else(|| ServerError::NotFound(path.clone()))?;
    let mime = htapp_assets::mime_for(&path);

    Ok(([(header::CONTENT_TYPE, mime)], content.into_owned()).into_response())
}
