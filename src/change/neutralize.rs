//! Formatting neutralization before classification.
//!
//! Markdown markers (`**bold**`, `*italic*`, `_underline_`, stray `*`/`_`)
//! and line breaks confuse the classifier's tokenizer. Each one becomes a
//! space, so every content character keeps its offset and entity spans map
//! straight back onto the original text.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

fn marker_re() -> &'static Regex {
    static MARKER_RE: OnceLock<Regex> = OnceLock::new();
    MARKER_RE.get_or_init(|| Regex::new(r"\r\n|[*_\n]+").unwrap())
}

/// Replace formatting markers and newlines with spaces of the same length
pub fn neutralize_formatting(text: &str) -> Cow<'_, str> {
    marker_re().replace_all(text, |caps: &Captures<'_>| " ".repeat(caps[0].len()))
}
