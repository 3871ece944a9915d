//! `<img src>` rewriting: local files to server URLs, relative paths to
//! inline `data:` URIs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;
use scraper::{Html, Node};

use crate::FILE_URL_PREFIX;
use crate::dom::with_attribute;
use crate::sniff::sniff_mime;
use crate::source::ContentSource;

/// Local-file scheme prefix.
const FILE_SCHEME: &str = "file://";

/// How an image source value is handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// `file://` URL; holds the path after the scheme prefix.
    LocalFile(&'a str),
    /// Path relative to the document root, to be inlined.
    Relative(&'a str),
    /// Data URI, absolute http(s) URL, or empty value: left as is.
    Unchanged,
}

/// Classify an image `src` value.
pub fn classify_image_source(src: &str) -> ImageSource<'_> {
    if let Some(path) = src.strip_prefix(FILE_SCHEME) {
        ImageSource::LocalFile(path)
    } else if src.is_empty()
        || src.starts_with("data:")
        || src.starts_with("http://")
        || src.starts_with("https://")
    {
        ImageSource::Unchanged
    } else {
        ImageSource::Relative(src)
    }
}

/// Map a `file://` URL to the server's local file URL.
///
/// Only the scheme prefix is replaced; drive letters and escapes are kept.
/// Values without the prefix are appended as they are.
pub fn convert_file_src(file_path: &str) -> String {
    let path = file_path.strip_prefix(FILE_SCHEME).unwrap_or(file_path);
    format!("{FILE_URL_PREFIX}{path}")
}

/// Rewrite the `src` of every `<img>` in `document`.
///
/// Visits each node once in document order. Relative images that cannot be
/// read keep their original `src` and are logged.
///
/// Returns the number of rewritten images.
pub fn rewrite_images(document: &mut Html, content: &dyn ContentSource) -> usize {
    let mut rewritten = 0;
    let mut stack = vec![document.tree.root().id()];

    while let Some(id) = stack.pop() {
        let Some(node) = document.tree.get(id) else {
            continue;
        };

        let replacement = node
            .value()
            .as_element()
            .filter(|el| el.name() == "img")
            .and_then(|el| {
                let src = el.attr("src")?;
                let new_src = rewrite_src(src, content)?;
                Some(with_attribute(el, "src", &new_src))
            });

        let children: Vec<_> = node.children().map(|child| child.id()).collect();
        stack.extend(children.into_iter().rev());

        if let Some(element) = replacement
            && let Some(mut node) = document.tree.get_mut(id)
        {
            *node.value() = Node::Element(element);
            rewritten += 1;
        }
    }

    rewritten
}

/// Compute the new value for an image `src`, or `None` to keep it.
fn rewrite_src(src: &str, content: &dyn ContentSource) -> Option<String> {
    match classify_image_source(src) {
        ImageSource::LocalFile(_) => Some(convert_file_src(src)),
        ImageSource::Relative(path) => embed_relative(path, content),
        ImageSource::Unchanged => None,
    }
}

/// Read a relative image and encode it as a `data:` URI.
fn embed_relative(src: &str, content: &dyn ContentSource) -> Option<String> {
    // Query and fragment are URL syntax, not part of the file name
    let path = src.split(['?', '#']).next().unwrap_or(src);
    let path = percent_decode_str(path).decode_utf8_lossy();

    match content.read(&path) {
        Ok(data) => {
            let mime = sniff_mime(&data, &path);
            Some(format!("data:{mime};base64,{}", STANDARD.encode(&data)))
        }
        Err(e) => {
            tracing::warn!(src = %src, error = %e, "Could not read image file for embedding");
            None
        }
    }
}
