//! HTTP request handlers.

pub(crate) mod api;
pub(crate) mod document;
pub(crate) mod embed;
pub(crate) mod files;

use std::path::{Component, Path, PathBuf};

use axum::body::Body;
use axum::extract::Request;
use axum::response::Response;
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// Join a request path onto `root`, rejecting anything that could escape it.
///
/// Returns `None` for parent, root, or prefix components.
pub(crate) fn resolve_under(root: &Path, rel: &str) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();
    for component in Path::new(rel).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(resolved)
}

/// Stream a file from disk with a MIME type guessed from its extension.
///
/// Honors conditional and range headers from `req`.
pub(crate) async fn serve_file(path: &Path, req: Request) -> Response {
    ServeFile::new(path)
        .oneshot(req)
        .await
        .map(|response| response.map(Body::new))
        .unwrap_or_else(|never| match never {})
}
