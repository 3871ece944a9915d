//! Runtime scripts embedded into the htapp binary.
//!
//! Every served HTML page references these scripts under `/embed/`:
//!
//! - [`RUNTIME_SCRIPT`]: the `window.htapp` API backed by `/api/*`
//! - [`LIVE_RELOAD_SCRIPT`]: the development-mode WebSocket client
//!
//! Assets are compiled into the binary via `rust-embed`, so the served
//! application never depends on files next to the executable.

use std::borrow::Cow;

/// Embedded runtime assets.
#[derive(rust_embed::RustEmbed)]
#[folder = "assets"]
#[prefix = ""]
struct Assets;

/// File name of the runtime support script.
pub const RUNTIME_SCRIPT: &str = "runtime.js";

/// File name of the live reload client script.
pub const LIVE_RELOAD_SCRIPT: &str = "development.js";

/// Get an embedded asset by path (relative to the assets folder).
///
/// Returns the file contents if the asset exists, `None` otherwise.
pub fn get(path: &str) -> Option<Cow<'static, [u8]>> {
    Assets::get(path).map(|f| f.data)
}

/// Iterate all embedded asset paths.
pub fn iter() -> impl Iterator<Item = Cow<'static, str>> {
    Assets::iter()
}

/// Return the MIME type string for the given file path.
pub fn mime_for(path: &str) -> &'static str {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
}
