//! Source byte decoding.
//!
//! A byte order mark selects UTF-8 or UTF-16. Anything else is read as UTF-8,
//! with undecodable bytes (legacy single-byte pages) replaced by U+FFFD so the
//! page still renders.

use std::borrow::Cow;

use crate::TransformError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const UTF16LE_BOM: &[u8] = b"\xFF\xFE";
const UTF16BE_BOM: &[u8] = b"\xFE\xFF";

/// Decode document bytes to text.
pub(crate) fn decode(source: &[u8]) -> Result<Cow<'_, str>, TransformError> {
    if let Some(rest) = source.strip_prefix(UTF8_BOM) {
        return Ok(decode_utf8_lossy(rest));
    }
    if let Some(rest) = source.strip_prefix(UTF16LE_BOM) {
        return decode_utf16(rest, u16::from_le_bytes).map(Cow::Owned);
    }
    if let Some(rest) = source.strip_prefix(UTF16BE_BOM) {
        return decode_utf16(rest, u16::from_be_bytes).map(Cow::Owned);
    }
    Ok(decode_utf8_lossy(source))
}

fn decode_utf8_lossy(bytes: &[u8]) -> Cow<'_, str> {
    let text = String::from_utf8_lossy(bytes);
    if matches!(text, Cow::Owned(_)) {
        tracing::warn!("Document is not valid UTF-8, undecodable bytes replaced");
    }
    text
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String, TransformError> {
    let chunks = bytes.chunks_exact(2);
    if !chunks.remainder().is_empty() {
        return Err(TransformError::TruncatedUtf16);
    }
    let units = chunks.map(|pair| unit([pair[0], pair[1]]));
    Ok(char::decode_utf16(units).collect::<Result<String, _>>()?)
}
