//! Content-based MIME type detection for embedded images.
//!
//! Signatures follow the image type pattern table of the WHATWG MIME
//! Sniffing standard, with SVG recognized from its markup.

/// Number of leading bytes inspected for text signatures.
const SNIFF_LEN: usize = 512;

/// Fallback for content nothing else recognizes.
const OCTET_STREAM: &str = "application/octet-stream";

/// A byte pattern with a mask; `0x00` mask bytes match anything.
struct Signature {
    pattern: &'static [u8],
    mask: &'static [u8],
    mime: &'static str,
}

const fn exact(pattern: &'static [u8], mime: &'static str) -> Signature {
    Signature {
        pattern,
        mask: &[],
        mime,
    }
}

const SIGNATURES: &[Signature] = &[
    exact(b"\x89PNG\r\n\x1A\n", "image/png"),
    exact(b"\xFF\xD8\xFF", "image/jpeg"),
    exact(b"GIF87a", "image/gif"),
    exact(b"GIF89a", "image/gif"),
    Signature {
        pattern: b"RIFF\x00\x00\x00\x00WEBPVP",
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF",
        mime: "image/webp",
    },
    Signature {
        pattern: b"\x00\x00\x00\x00ftypavif",
        mask: b"\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF",
        mime: "image/avif",
    },
    exact(b"BM", "image/bmp"),
    exact(b"\x00\x00\x01\x00", "image/x-icon"),
    exact(b"\x00\x00\x02\x00", "image/x-icon"),
    exact(b"%PDF-", "application/pdf"),
];

impl Signature {
    fn matches(&self, data: &[u8]) -> bool {
        if data.len() < self.pattern.len() {
            return false;
        }
        if self.mask.is_empty() {
            return data.starts_with(self.pattern);
        }
        self.pattern
            .iter()
            .zip(self.mask)
            .zip(data)
            .all(|((p, m), d)| d & m == p & m)
    }
}

/// Detect the MIME type of `data`.
///
/// Binary signatures are checked first, then SVG/XML markup. Content that
/// matches nothing falls back to a guess from `path`'s extension, then to
/// `application/octet-stream`.
pub fn sniff_mime(data: &[u8], path: &str) -> &'static str {
    if let Some(sig) = SIGNATURES.iter().find(|sig| sig.matches(data)) {
        return sig.mime;
    }
    if let Some(mime) = sniff_markup(data) {
        return mime;
    }

    mime_guess::from_path(path).first_raw().unwrap_or(OCTET_STREAM)
}

/// Recognize SVG and generic XML from the leading text.
fn sniff_markup(data: &[u8]) -> Option<&'static str> {
    let head = &data[..data.len().min(SNIFF_LEN)];
    let head = head.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(head);
    let start = head.iter().position(|b| !b.is_ascii_whitespace())?;
    let head = &head[start..];

    if head.starts_with(b"<") && contains_ignore_case(head, b"<svg") {
        return Some("image/svg+xml");
    }
    if head.starts_with(b"<?xml") {
        return Some("text/xml");
    }
    None
}

fn contains_ignore_case(data: &[u8], needle: &[u8]) -> bool {
    data.windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}
