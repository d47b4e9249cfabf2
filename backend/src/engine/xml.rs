//! Character-data helpers for WordprocessingML parts.

use quick_xml::escape::{escape, unescape};
use std::borrow::Cow;

/// Resolves predefined and numeric character references, so `R&amp;D` and
/// `R&#38;D` both read as `R&D`.
///
/// Text holding a reference that cannot be resolved is returned unchanged.
pub fn decode_text(text: &str) -> Cow<'_, str> {
    unescape(text).unwrap_or(Cow::Borrowed(text))
}

/// Escapes `text` for use as element content or an attribute value.
pub fn encode_text(text: &str) -> Cow<'_, str> {
    escape(text)
}
