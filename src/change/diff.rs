//! Prefix/suffix diff between two plain-text baselines.

use serde::{Deserialize, Serialize};

use crate::config::DetectionConfig;

/// Changed region of the current text, as a char offset plus its content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncrementalChange {
    pub content: String,
    pub offset: usize,
}

impl IncrementalChange {
    /// Length in chars
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

fn is_blank(chars: &[char]) -> bool {
    chars.iter().all(|c| c.is_whitespace())
}

/// Minimal changed region of `current` relative to `previous`.
///
/// `None` means there is nothing worth sending incrementally: either no
/// change, or a change too large to be anything but a full recheck.
pub fn extract_incremental_content(
    previous: &str,
    current: &str,
    config: &DetectionConfig,
) -> Option<IncrementalChange> {
    let prev: Vec<char> = previous.chars().collect();
    let curr: Vec<char> = current.chars().collect();

    if is_blank(&prev) {
        if curr.len() >= config.initial_max_chars || is_blank(&curr) {
            return None;
        }
        return Some(IncrementalChange {
            content: current.to_string(),
            offset: 0,
        });
    }

    let min_len = prev.len().min(curr.len());
    let prefix = prev
        .iter()
        .zip(&curr)
        .take_while(|(a, b)| a == b)
        .count();
    // Suffix never reaches back into the prefix
    let suffix = prev
        .iter()
        .rev()
        .zip(curr.iter().rev())
        .take(min_len - prefix)
        .take_while(|(a, b)| a == b)
        .count();

    let max_size = config.max_incremental_chars(curr.len());
    let region = &curr[prefix..curr.len() - suffix];
    if !region.is_empty() && region.len() <= max_size && !is_blank(region) {
        return Some(IncrementalChange {
            content: region.iter().collect(),
            offset: prefix,
        });
    }

    // Pure append at the very end
    if curr.len() > prev.len() && curr.starts_with(&prev) {
        let added = &curr[prev.len()..];
        if added.len() <= max_size && !is_blank(added) {
            return Some(IncrementalChange {
                content: added.iter().collect(),
                offset: prev.len(),
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(previous: &str, current: &str) -> Option<IncrementalChange> {
        extract_incremental_content(previous, current, &DetectionConfig::default())
    }

    // -------------------------------------------------------------------------
    // Requirement 1: Identical texts produce no change
    // -------------------------------------------------------------------------
    #[test]
    fn test_identical_is_none() {
        assert_eq!(diff("Hello world", "Hello world"), None);
        assert_eq!(diff("", ""), None);
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Insertion yields the minimal span
    // -------------------------------------------------------------------------
    #[test]
    fn test_insertion_minimal_span() {
        let previous = "Hello world";
        let current = "Hello brave world";
        let change = diff(previous, current).unwrap();
        assert_eq!(change.content, "brave ");
        assert_eq!(change.offset, 6);

        // Splicing the region into the previous text reproduces the current one
        let rebuilt = format!("{}{}{}", &previous[..6], change.content, &previous[6..]);
        assert_eq!(rebuilt, current);
    }

    // -------------------------------------------------------------------------
    // Requirement 3: No baseline sends everything below the initial bound
    // -------------------------------------------------------------------------
    #[test]
    fn test_empty_previous() {
        let change = diff("", "John lives here").unwrap();
        assert_eq!(change.offset, 0);
        assert_eq!(change.content, "John lives here");

        let big = "a".repeat(5000);
        assert_eq!(diff("  ", &big), None);
    }

    // -------------------------------------------------------------------------
    // Requirement 4: Whitespace-only edits are not worth a call
    // -------------------------------------------------------------------------
    #[test]
    fn test_whitespace_only_change() {
        assert_eq!(diff("Hello world", "Hello  world"), None);
    }

    // -------------------------------------------------------------------------
    // Requirement 5: Oversized regions signal a full recheck
    // -------------------------------------------------------------------------
    #[test]
    fn test_oversized_region() {
        let previous = format!("start {} end", "x".repeat(3000));
        let current = format!("start {} end", "y".repeat(3000));
        assert_eq!(diff(&previous, &current), None);
    }

    #[test]
    fn test_replacement_and_deletion() {
        let change = diff("Call Jon now", "Call Tom now").unwrap();
        assert_eq!(change.content, "Tom");
        assert_eq!(change.offset, 5);

        // Pure deletion leaves an empty region
        assert_eq!(diff("Call Jon now", "Call now"), None);
    }

    #[test]
    fn test_repeated_chars_do_not_overlap() {
        // prefix "aaa", suffix bounded to the remaining 0 chars of previous
        let change = diff("aaa", "aaaa").unwrap();
        assert_eq!(change.offset, 3);
        assert_eq!(change.content, "a");
    }

    #[test]
    fn test_multibyte_offsets() {
        let change = diff("Grüße an Zoë", "Grüße an Zoë Müller").unwrap();
        assert_eq!(change.offset, 12);
        assert_eq!(change.content, " Müller");
    }
}
