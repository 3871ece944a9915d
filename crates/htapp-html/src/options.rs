//! `<htapp:application>` options embedded in the served document.

use scraper::Html;

/// Tag carrying application options.
const OPTIONS_TAG: &str = "htapp:application";

/// Application window options declared by the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppOptions {
    /// Initial window width in pixels.
    pub width: u32,
    /// Initial window height in pixels.
    pub height: u32,
}

impl AppOptions {
    /// Browser argument setting the initial window size.
    #[must_use]
    pub fn window_size_arg(&self) -> String {
        format!("--window-size={},{}", self.width, self.height)
    }
}

/// Read options from the first `<htapp:application>` element.
///
/// Both `width` and `height` must be present and numeric; otherwise the
/// document declares no options.
pub fn find_app_options(document: &Html) -> Option<AppOptions> {
    let element = document
        .tree
        .root()
        .descendants()
        .filter_map(|node| node.value().as_element())
        .find(|el| el.name().eq_ignore_ascii_case(OPTIONS_TAG))?;

    let parse = |name: &str| element.attr(name)?.trim().parse::<u32>().ok();
    match (parse("width"), parse("height")) {
        (Some(width), Some(height)) => Some(AppOptions { width, height }),
        _ => {
            tracing::debug!("Ignoring <{OPTIONS_TAG}> without numeric width and height");
            None
        }
    }
}
