//! Word-completion heuristic.
//!
//! A cheap pre-check run before the heavier diff: which completed words
//! appear in the current text that were not in the previous one.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use super::diff::extract_incremental_content;
use crate::config::DetectionConfig;
use crate::text::{char_len, CharText};

/// Chars either side of an incremental change re-checked for completed words
const WORD_CONTEXT_RADIUS: usize = 10;

fn word_re() -> &'static Regex {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    // ASCII word runs, matching a JavaScript `\b\w+\b`
    WORD_RE.get_or_init(|| Regex::new(r"[A-Za-z0-9_]+").unwrap())
}

/// Lowercased alphabetic tokens of at least `min_len` chars
pub fn extract_completed_words(text: &str, min_len: usize) -> BTreeSet<String> {
    if text.trim().is_empty() {
        return BTreeSet::new();
    }
    word_re()
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|w| w.len() >= min_len && w.bytes().all(|b| b.is_ascii_alphabetic()))
        .map(|w| w.to_ascii_lowercase())
        .collect()
}

/// Words present in `current` but not in `previous`, in sorted order.
///
/// When nothing new shows up but the text grew, a small window around the
/// incremental change is compared instead, catching a word that was just
/// completed next to an existing one.
pub fn find_new_words(previous: &str, current: &str, config: &DetectionConfig) -> Vec<String> {
    let min_len = config.min_word_len;
    let before = extract_completed_words(previous, min_len);
    let after = extract_completed_words(current, min_len);
    let mut new_words: Vec<String> = after.difference(&before).cloned().collect();

    if new_words.is_empty() && char_len(current) > char_len(previous) {
        if let Some(change) = extract_incremental_content(previous, current, config) {
            if !change.content.trim().is_empty() {
                let prev = CharText::new(previous);
                let curr = CharText::new(current);
                let start = change.offset.saturating_sub(WORD_CONTEXT_RADIUS);
                let end = (change.offset + change.len() + WORD_CONTEXT_RADIUS).min(curr.len());

                let context_before = extract_completed_words(prev.slice(start, end), min_len);
                let context_after = extract_completed_words(curr.slice(start, end), min_len);
                new_words.extend(context_after.difference(&context_before).cloned());
            }
        }
    }

    new_words
}

/// Symmetric difference of the two word sets is non-empty
pub fn word_sets_differ(previous: &str, current: &str, min_len: usize) -> bool {
    extract_completed_words(previous, min_len) != extract_completed_words(current, min_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_filters_short_and_mixed_tokens() {
        let words = extract_completed_words("Hi Bob, call 555-1234 or mail bob_2 at Acme!", 3);
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        assert_eq!(words, vec!["acme", "bob", "call", "mail"]);
    }

    #[test]
    fn test_extract_blank() {
        assert!(extract_completed_words("   \n", 3).is_empty());
    }

    #[test]
    fn test_find_new_words() {
        let config = DetectionConfig::default();
        let new_words = find_new_words("Hello world", "Hello brave new world", &config);
        assert_eq!(new_words, vec!["brave".to_string(), "new".to_string()]);
    }

    #[test]
    fn test_no_new_words_for_repeat() {
        let config = DetectionConfig::default();
        assert!(find_new_words("Hello world", "Hello world world", &config).is_empty());
    }

    #[test]
    fn test_word_sets_differ() {
        assert!(!word_sets_differ("Call John", "call john!", 3));
        assert!(word_sets_differ("Call John", "Call Jane", 3));
    }
}
