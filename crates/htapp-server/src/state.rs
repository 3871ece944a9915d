//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::live_reload::LiveReloadManager;

/// Characters escaped in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Directory the application is served from.
    pub(crate) root_dir: PathBuf,
    /// Document opened at startup, relative to `root_dir` (`None` for the
    /// directory index).
    pub(crate) entry: Option<String>,
    /// Live reload manager (development mode only).
    pub(crate) live_reload: Option<LiveReloadManager>,
    /// Extra command-line arguments exposed to the page.
    pub(crate) app_args: Vec<String>,
    /// Log every request.
    pub(crate) log_requests: bool,
}

impl AppState {
    /// Whether the server runs in development mode.
    #[must_use]
    pub(crate) fn dev_mode(&self) -> bool {
        self.live_reload.is_some()
    }

    /// URL path of the entry document.
    #[must_use]
    pub(crate) fn entry_path(&self) -> String {
        match &self.entry {
            Some(entry) => format!("/app/{}", utf8_percent_encode(entry, PATH_SEGMENT)),
            None => "/app/".to_owned(),
        }
    }
}
