//! ChangeDetector: What Changed, and Is It Worth a Classifier Call?
//!
//! Content hashing skips identical snapshots outright. For real edits the
//! detector diffs against the baseline last sent for classification and
//! expands the changed region into a paragraph-aware snippet.
//!
//! # Pipeline
//! 1. `has_changed` - hash check, counts skips
//! 2. `find_new_words` - cheap completed-word heuristic
//! 3. `diff` - common prefix/suffix region with size gates
//! 4. `context_snippet` - paragraph-bounded window sent to the classifier

pub mod context;
pub mod debounce;
pub mod diff;
pub mod neutralize;
pub mod words;

pub use context::{create_context_snippet, ContextSnippet};
pub use debounce::{has_significant_content, smart_debounce_delay};
pub use diff::{extract_incremental_content, IncrementalChange};
pub use neutralize::neutralize_formatting;
pub use words::{extract_completed_words, find_new_words, word_sets_differ};

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::config::DetectionConfig;

// =============================================================================
// Types
// =============================================================================

/// Result of a hash check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeResult {
    /// True if the text differs from the last check
    pub has_changed: bool,
    pub content_hash: u64,
    pub previous_hash: Option<u64>,
}

// =============================================================================
// ChangeDetector
// =============================================================================

#[derive(Debug, Clone)]
pub struct ChangeDetector {
    config: DetectionConfig,
    last_hash: Option<u64>,
    check_count: u64,
    skip_count: u64,
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new(DetectionConfig::default())
    }
}

impl ChangeDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            config,
            last_hash: None,
            check_count: 0,
            skip_count: 0,
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// True if `text` differs from the last checked text. The first check
    /// always counts as changed.
    pub fn has_changed(&mut self, text: &str) -> bool {
        self.check(text).has_changed
    }

    pub fn check(&mut self, text: &str) -> ChangeResult {
        self.check_count += 1;

        let content_hash = Self::compute_hash(text);
        let previous_hash = self.last_hash;
        let has_changed = previous_hash != Some(content_hash);
        if !has_changed {
            self.skip_count += 1;
        }
        self.last_hash = Some(content_hash);

        ChangeResult {
            has_changed,
            content_hash,
            previous_hash,
        }
    }

    fn compute_hash(text: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        hasher.finish()
    }

    pub fn last_hash(&self) -> Option<u64> {
        self.last_hash
    }

    pub fn check_count(&self) -> u64 {
        self.check_count
    }

    pub fn skip_count(&self) -> u64 {
        self.skip_count
    }

    /// Percentage of checks skipped as unchanged
    pub fn skip_rate(&self) -> f64 {
        if self.check_count == 0 {
            return 0.0;
        }
        (self.skip_count as f64 / self.check_count as f64) * 100.0
    }

    /// Forget the last hash and counters
    pub fn reset(&mut self) {
        self.last_hash = None;
        self.check_count = 0;
        self.skip_count = 0;
    }

    pub fn diff(&self, previous: &str, current: &str) -> Option<IncrementalChange> {
        extract_incremental_content(previous, current, &self.config)
    }

    pub fn context_snippet(&self, text: &str, change_offset: usize, change_len: usize) -> ContextSnippet {
        create_context_snippet(text, change_offset, change_len, &self.config)
    }

    pub fn find_new_words(&self, previous: &str, current: &str) -> Vec<String> {
        find_new_words(previous, current, &self.config)
    }

    pub fn debounce_delay(&self, new_words: &[String], change: Option<&IncrementalChange>) -> u64 {
        smart_debounce_delay(
            new_words,
            change.map(|c| c.content.as_str()),
            self.config.base_debounce_ms,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Requirement 1: First check returns changed, repeats are skipped
    // -------------------------------------------------------------------------
    #[test]
    fn test_hash_skip_counts() {
        let mut detector = ChangeDetector::default();
        assert!(detector.has_changed("Hello"));
        assert!(!detector.has_changed("Hello"));
        assert!(!detector.has_changed("Hello"));
        assert!(detector.has_changed("Hello "));

        assert_eq!(detector.check_count(), 4);
        assert_eq!(detector.skip_count(), 2);
        assert!((detector.skip_rate() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_check_result_and_reset() {
        let mut detector = ChangeDetector::default();
        let first = detector.check("Call John");
        assert!(first.previous_hash.is_none());
        let second = detector.check("Call John");
        assert_eq!(second.previous_hash, Some(first.content_hash));

        detector.reset();
        assert!(detector.last_hash().is_none());
        assert_eq!(detector.check_count(), 0);
        assert!(detector.has_changed("Call John"));
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Diff feeds the snippet
    // -------------------------------------------------------------------------
    #[test]
    fn test_diff_then_snippet() {
        let detector = ChangeDetector::default();
        let previous = "Notes for today.\n\nMeeting with the team.";
        let current = "Notes for today.\n\nMeeting with John Smith and the team.";

        let change = detector.diff(previous, current).unwrap();
        let snippet = detector.context_snippet(current, change.offset, change.len());
        assert!(snippet.content.contains("John Smith"));
        assert_eq!(&current[snippet.offset..snippet.offset + snippet.content.len()], snippet.content);
    }

    #[test]
    fn test_debounce_uses_base() {
        let detector = ChangeDetector::new(DetectionConfig {
            base_debounce_ms: 300,
            ..DetectionConfig::default()
        });
        let words = vec!["john".to_string()];
        assert_eq!(detector.debounce_delay(&words, None), 600);
    }
}
