//! Local file endpoints.
//!
//! `/file/{path}` serves any local file by absolute path. Image URLs produced
//! by `convertFileSrc` and by the `file://` rewrite point here.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::response::Response;
use htapp_html::FILE_URL_PREFIX;
use percent_encoding::percent_decode_str;

use super::serve_file;
use crate::error::ServerError;
use crate::state::AppState;

/// Favicon served from the application directory.
const FAVICON: &str = "favicon.ico";

/// Handle GET /file/{path}.
///
/// The path is taken from the raw URI and percent-decoded once, so encoded
/// slashes and drive letters survive exactly as the page wrote them.
pub(crate) async fn get_local_file(req: Request) -> Result<Response, ServerError> {
    let raw = req
        .uri()
        .path()
        .strip_prefix(FILE_URL_PREFIX)
        .unwrap_or_default();
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| ServerError::BadRequest(format!("Path is not valid UTF-8: {raw}")))?;
    let path = PathBuf::from(decoded.as_ref());

    serve_regular_file(path, req).await
}

/// Handle GET /favicon.ico.
pub(crate) async fn get_favicon(
    State(state): State<Arc<AppState>>,
    req: Request,
) -> Result<Response, ServerError> {
    serve_regular_file(state.root_dir.join(FAVICON), req).await
}

async fn serve_regular_file(path: PathBuf, req: Request) -> Result<Response, ServerError> {
    let display = path.display().to_string();
    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|e| ServerError::from_io(e, &display))?;
    if !metadata.is_file() {
        return Err(ServerError::NotFound(display));
    }

    Ok(serve_file(&path, req).await)
}
