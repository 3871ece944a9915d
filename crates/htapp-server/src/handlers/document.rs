//! Application document endpoint.
//!
//! Serves the application directory under `/app/`. HTML documents pass
//! through the transform engine on every request; everything else is served
//! from disk as is.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{self, Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use htapp_html::DirSource;

use super::{resolve_under, serve_file};
use crate::error::ServerError;
use crate::state::AppState;

/// Document served for a directory.
const INDEX_FILE: &str = "index.html";

/// Handle GET / by redirecting to the entry document.
pub(crate) async fn redirect_to_app(State(state): State<Arc<AppState>>) -> Response {
    found(&state.entry_path())
}

/// Handle GET /app and /app/.
pub(crate) async fn get_app_root(
    State(state): State<Arc<AppState>>,
    req: Request,
) -> Result<Response, ServerError> {
    serve_document(&state, "", req).await
}

/// Handle GET /app/{path}.
pub(crate) async fn get_app_path(
    State(state): State<Arc<AppState>>,
    extract::Path(path): extract::Path<String>,
    req: Request,
) -> Result<Response, ServerError> {
    serve_document(&state, &path, req).await
}

async fn serve_document(state: &AppState, rel: &str, req: Request) -> Result<Response, ServerError> {
    let path =
        resolve_under(&state.root_dir, rel).ok_or_else(|| ServerError::NotFound(rel.to_owned()))?;
    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|e| ServerError::from_io(e, rel))?;

    let path = if metadata.is_dir() {
        let uri_path = req.uri().path();
        if !uri_path.ends_with('/') {
            return Ok(found(&format!("{uri_path}/")));
        }
        path.join(INDEX_FILE)
    } else {
        path
    };

    if is_html(&path) {
        render_html(state, path, rel).await
    } else {
        Ok(serve_file(&path, req).await)
    }
}

/// Read and transform an HTML document.
///
/// Relative images resolve against the application root, wherever the
/// document sits below it.
async fn render_html(state: &AppState, path: PathBuf, rel: &str) -> Result<Response, ServerError> {
    let source = tokio::fs::read(&path)
        .await
        .map_err(|e| ServerError::from_io(e, rel))?;
    let content = DirSource::new(state.root_dir.clone());
    let dev_mode = state.dev_mode();

    let html = tokio::task::spawn_blocking(move || {
        htapp_html::transform(&source, &content, dev_mode)
    })
    .await
    .map_err(|e| ServerError::Internal(e.to_string()))??;

    Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html).into_response())
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_owned())]).into_response()
}
