//! EntityMerger: Mask-Preserving Merge
//!
//! Folds a fresh classifier result into the known entity set. The user's
//! `should_mask` choice always survives a re-detection of the same entity.

use std::collections::HashMap;

use super::types::{ClassifiedSpan, Entity, Occurrence};
use crate::config::LabelConfig;
use crate::text::CharText;

// =============================================================================
// EntityMerger
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct EntityMerger {
    labels: LabelConfig,
}

impl EntityMerger {
    pub fn new(labels: LabelConfig) -> Self {
        Self { labels }
    }

    /// Lookup key for a label: configured separators trimmed from both ends,
    /// lowercased when case-insensitive
    pub fn normalize_label(&self, label: &str) -> String {
        let trimmed = label.trim_matches(|c: char| self.labels.trim_chars.contains(c));
        if self.labels.case_insensitive {
            trimmed.to_lowercase()
        } else {
            trimmed.to_string()
        }
    }

    /// Lookup key for surface text: trimmed, lowercased
    fn normalize_text(text: &str) -> String {
        text.trim().to_lowercase()
    }

    /// Merge `incoming` into `existing`.
    ///
    /// A match by normalized label takes the incoming type, text and
    /// occurrences but keeps the existing label and `should_mask`. Failing
    /// that, a match by surface text (case-insensitive) consolidates into
    /// the existing entity: label, text and `should_mask` stay, occurrences
    /// are unioned. Anything else is appended with `should_mask = true`.
    /// Existing entities absent from `incoming` are kept untouched.
    pub fn merge(&self, existing: &[Entity], incoming: &[Entity]) -> Vec<Entity> {
        let mut merged: Vec<Entity> = existing.to_vec();
        let mut by_label: HashMap<String, usize> = HashMap::new();
        let mut by_text: HashMap<String, usize> = HashMap::new();
        for (i, e) in merged.iter().enumerate() {
            by_label.insert(self.normalize_label(&e.label), i);
            by_text.entry(Self::normalize_text(&e.text)).or_insert(i);
        }

        for entity in incoming {
            let key = self.normalize_label(&entity.label);
            let text_key = Self::normalize_text(&entity.text);

            if let Some(&i) = by_label.get(&key) {
                let current = &mut merged[i];
                current.entity_type = entity.entity_type.clone();
                current.text = entity.text.clone();
                current.occurrences = entity.occurrences.clone();
                by_text.entry(text_key).or_insert(i);
                continue;
            }

            match by_text.get(&text_key) {
                Some(&i) if !text_key.is_empty() => {
                    let current = &mut merged[i];
                    for occurrence in &entity.occurrences {
                        if !current.occurrences.contains(occurrence) {
                            current.occurrences.push(*occurrence);
                        }
                    }
                    current.occurrences.sort_by_key(|o| (o.start, o.end));
                    by_label.insert(key, i);
                }
                _ => {
                    by_label.insert(key, merged.len());
                    by_text.entry(text_key).or_insert(merged.len());
                    merged.push(Entity {
                        should_mask: true,
                        ..entity.clone()
                    });
                }
            }
        }

        merged
    }

    /// Fold another state's entities in without touching existing ones.
    ///
    /// Unknown labels are appended with their own `should_mask`; used when
    /// temporary new-chat state moves into a conversation.
    pub fn absorb(&self, existing: &[Entity], other: &[Entity]) -> Vec<Entity> {
        let mut merged: Vec<Entity> = existing.to_vec();
        for entity in other {
            let key = self.normalize_label(&entity.label);
            if !merged.iter().any(|e| self.normalize_label(&e.label) == key) {
                merged.push(entity.clone());
            }
        }
        merged
    }
}

// =============================================================================
// Classifier Spans
// =============================================================================

/// Group classifier spans by label into entities in document coordinates.
///
/// `text` is the exact string that was classified and `offset` its char
/// position in the full plain text. Spans outside `text` are dropped.
pub fn spans_to_entities(spans: &[ClassifiedSpan], text: &str, offset: usize) -> Vec<Entity> {
    let chars = CharText::new(text);
    let mut entities: Vec<Entity> = Vec::new();
    let mut by_label: HashMap<&str, usize> = HashMap::new();

    for span in spans {
        if span.start >= span.end || span.end > chars.len() {
            continue;
        }
        let occurrence = Occurrence::new(span.start, span.end).shifted(offset);
        match by_label.get(span.label.as_str()) {
            Some(&i) => {
                if !entities[i].occurrences.contains(&occurrence) {
                    entities[i].occurrences.push(occurrence);
                }
            }
            None => {
                by_label.insert(span.label.as_str(), entities.len());
                let surface = chars.slice(span.start, span.end).trim();
                entities.push(
                    Entity::new(&span.label, span.entity_type.clone(), surface)
                        .with_occurrence(occurrence.start, occurrence.end),
                );
            }
        }
    }

    entities
}
