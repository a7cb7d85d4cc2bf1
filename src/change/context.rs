//! Paragraph-aware context snippets.
//!
//! The classifier sees the paragraph holding the change plus small
//! neighbours, never the whole document.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::config::DetectionConfig;
use crate::text::CharText;

/// Text sent for classification and its char offset in the full text.
///
/// Always satisfies `text[offset..offset + len(content)] == content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSnippet {
    pub content: String,
    pub offset: usize,
}

fn blank_line_re() -> &'static Regex {
    static BLANK_LINE_RE: OnceLock<Regex> = OnceLock::new();
    BLANK_LINE_RE.get_or_init(|| Regex::new(r"\n\s*\n").unwrap())
}

fn paragraph_start_re() -> &'static Regex {
    static PARAGRAPH_START_RE: OnceLock<Regex> = OnceLock::new();
    // Capital letter, "12." numbered item, or bullet marker
    PARAGRAPH_START_RE.get_or_init(|| Regex::new(r"^\s*(?:[A-Z]|\d+\.|[-•*])").unwrap())
}

/// Sorted char offsets where paragraphs start, including 0 and the text length.
///
/// A break is moved past any whitespace that follows it, so runs of blank
/// lines never form paragraphs of their own.
fn paragraph_breaks(text: &CharText<'_>) -> Vec<usize> {
    let s = text.as_str();
    let skip_ws = |mut idx: usize| {
        while text.char_at(idx).map_or(false, char::is_whitespace) {
            idx += 1;
        }
        idx
    };
    let mut breaks = vec![0, text.len()];

    for m in blank_line_re().find_iter(s) {
        breaks.push(skip_ws(text.char_of(m.end())));
    }
    for (byte, _) in s.match_indices('\n') {
        if paragraph_start_re().is_match(&s[byte + 1..]) {
            breaks.push(skip_ws(text.char_of(byte + 1)));
        }
    }

    breaks.sort_unstable();
    breaks.dedup();
    breaks
}

/// Build the snippet for a change of `change_len` chars at `change_offset`
pub fn create_context_snippet(
    text: &str,
    change_offset: usize,
    change_len: usize,
    config: &DetectionConfig,
) -> ContextSnippet {
    let chars = CharText::new(text);
    let len = chars.len();
    let change_end = (change_offset + change_len).min(len);
    let breaks = paragraph_breaks(&chars);

    // Paragraph holding the change
    let para = breaks
        .windows(2)
        .position(|w| change_offset >= w[0] && change_offset < w[1]);
    let (para_start, para_end) = match para {
        Some(i) => (breaks[i], breaks[i + 1]),
        None => (0, len),
    };

    let mut start = para_start;
    let mut end = para_end;

    // One small neighbour on each side
    if let Some(i) = para.filter(|&i| i > 0) {
        if para_start - breaks[i - 1] < config.adjacent_paragraph_max_chars {
            start = breaks[i - 1];
        }
    }
    if let Some(next_end) = para.and_then(|i| breaks.get(i + 2)) {
        if next_end - para_end < config.adjacent_paragraph_max_chars {
            end = *next_end;
        }
    }

    let cap = config.context_max_chars;
    if end - start > cap {
        let para_size = para_end - para_start;
        if para_size > cap {
            let radius = cap / 2;
            start = change_offset.saturating_sub(radius);
            end = (change_end + radius).min(len);
        } else {
            let remaining = cap - para_size;
            let before = remaining / 2;
            let after = remaining - before;
            start = para_start.saturating_sub(before);
            end = (para_end + after).min(len);
        }
    }

    // Do not cut words at the edges
    let inside_word = |idx: usize| {
        let before = idx.checked_sub(1).and_then(|i| chars.char_at(i));
        let at = chars.char_at(idx);
        matches!((before, at), (Some(b), Some(a)) if !b.is_whitespace() && !a.is_whitespace())
    };
    if start > 0 && inside_word(start) {
        if let Some(space) = chars.find_char_from(' ', start) {
            if space < change_offset {
                start = space + 1;
            }
        }
    }
    if end < len && inside_word(end) {
        if let Some(space) = chars.rfind_char_upto(' ', end) {
            if space > change_end {
                end = space;
            }
        }
    }

    let raw = chars.slice(start, end);
    let leading = raw.chars().take_while(|c| c.is_whitespace()).count();
    ContextSnippet {
        content: raw.trim().to_string(),
        offset: start + leading,
    }
}
