//! HTML post-processing for htapp.
//!
//! Every HTML document served by htapp passes through [`transform`], which
//! parses the source into a fresh document tree and runs two passes over it:
//!
//! 1. [`inject_scripts`]: appends the runtime support script (and, in
//!    development mode, the live reload client) to the first `<head>`.
//! 2. [`rewrite_images`]: rewrites `<img src>` values. `file://` sources become
//!    server URLs under [`FILE_URL_PREFIX`]; relative paths are read through a
//!    [`ContentSource`] and inlined as `data:` URIs.
//!
//! The tree is serialized back to a string and discarded. Nothing is cached
//! or shared between documents.
//!
//! # Example
//!
//! ```ignore
//! use htapp_html::{DirSource, transform};
//!
//! let source = DirSource::new("/path/to/app");
//! let html = transform(b"<html><head></head><body></body></html>", &source, false)?;
//! assert!(html.contains("/embed/runtime.js"));
//! ```

mod dom;
mod encoding;
mod images;
mod inject;
mod options;
mod sniff;
mod source;

pub use images::{ImageSource, classify_image_source, convert_file_src, rewrite_images};
pub use inject::{LIVE_RELOAD_SCRIPT_URL, RUNTIME_SCRIPT_URL, inject_scripts};
pub use options::{AppOptions, find_app_options};
pub use scraper::Html;
pub use sniff::sniff_mime;
pub use source::{ContentSource, DirSource};

/// URL prefix under which the server exposes local files.
pub const FILE_URL_PREFIX: &str = "/file/";

/// Transform error.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// UTF-16 source containing an unpaired surrogate.
    #[error("document is not valid UTF-16: {0}")]
    Encoding(#[from] std::char::DecodeUtf16Error),
    /// UTF-16 source ending in half a code unit.
    #[error("document is not valid UTF-16: odd number of bytes")]
    TruncatedUtf16,
}

/// Parse source bytes into a document tree.
///
/// The HTML parser itself recovers from any malformed markup, and invalid
/// UTF-8 is replaced rather than rejected, so the only failure is a UTF-16
/// document (marked by its byte order mark) that does not decode.
pub fn parse_document(source: &[u8]) -> Result<Html, TransformError> {
    let text = encoding::decode(source)?;
    Ok(Html::parse_document(&text))
}

/// Parse, inject scripts, rewrite images, and serialize a document.
///
/// # Arguments
///
/// * `source` - Raw HTML bytes
/// * `content` - Source for relative image paths
/// * `dev_mode` - Also inject the live reload client
pub fn transform(
    source: &[u8],
    content: &dyn ContentSource,
    dev_mode: bool,
) -> Result<String, TransformError> {
    let mut document = parse_document(source)?;

    inject_scripts(&mut document, dev_mode);
    rewrite_images(&mut document, content);

    Ok(document.html())
}
