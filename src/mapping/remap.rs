//! Re-locating known entities after the document changes.
//!
//! Classifier offsets go stale as soon as the user types. Instead of shifting
//! them, each entity's surface text is searched for again in the current
//! mirror.

use super::mapper::PositionMapping;
use crate::entity::{Entity, Occurrence};

fn is_boundary_char(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => !(c.is_alphanumeric() || c == '_'),
    }
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Non-overlapping, case-insensitive matches of `needle` in `haystack`,
/// as char ranges. Single-word needles only match on word boundaries.
pub fn find_occurrences(haystack: &str, needle: &str) -> Vec<Occurrence> {
    let needle: Vec<char> = needle.trim().chars().collect();
    if needle.is_empty() {
        return Vec::new();
    }
    let hay: Vec<char> = haystack.chars().collect();
    let single_word = !needle.iter().any(|c| c.is_whitespace());

    let mut found = Vec::new();
    let mut i = 0;
    while i + needle.len() <= hay.len() {
        let end = i + needle.len();
        let matched = hay[i..end]
            .iter()
            .zip(&needle)
            .all(|(&a, &b)| chars_eq_ignore_case(a, b));
        let bounded = !single_word
            || (is_boundary_char(i.checked_sub(1).map(|p| hay[p]))
                && is_boundary_char(hay.get(end).copied()));
        if matched && bounded {
            found.push(Occurrence::new(i, end));
            i = end;
        } else {
            i += 1;
        }
    }
    found
}

/// Replace every entity's occurrences with its matches in the current mirror.
///
/// Entities no longer present keep their label and mask state with an empty
/// occurrence list. Returns how many entities still have occurrences.
pub fn remap_entities(entities: &mut [Entity], mapping: &PositionMapping) -> usize {
    let text = mapping.plain_text();
    let mut present = 0;
    for entity in entities.iter_mut() {
        entity.occurrences = find_occurrences(text, &entity.text);
        if !entity.occurrences.is_empty() {
            present += 1;
        }
    }
    present
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityType;
    use crate::mapping::{build_mapping, DocNode};

    #[test]
    fn test_find_case_insensitive() {
        let found = find_occurrences("John and JOHN and john", "John");
        assert_eq!(
            found,
            vec![Occurrence::new(0, 4), Occurrence::new(9, 13), Occurrence::new(18, 22)]
        );
    }

    #[test]
    fn test_single_word_needs_boundaries() {
        assert!(find_occurrences("Johnson", "John").is_empty());
        assert_eq!(find_occurrences("(John)", "John"), vec![Occurrence::new(1, 5)]);
    }

    #[test]
    fn test_multi_word_matches_anywhere() {
        let found = find_occurrences("xJohn Doe", "John Doe");
        assert_eq!(found, vec![Occurrence::new(1, 9)]);
    }

    #[test]
    fn test_multibyte_offsets_are_chars() {
        let found = find_occurrences("Hallo Zoë Müller", "müller");
        assert_eq!(found, vec![Occurrence::new(10, 16)]);
    }

    #[test]
    fn test_remap_entities_after_edit() {
        let doc = DocNode::doc(vec![
            DocNode::para_text("Dear team,"),
            DocNode::para_text("John called John."),
        ]);
        let mapping = build_mapping(&doc);
        let mut entities = vec![
            Entity::new("PERSON_1", EntityType::Person, "John")
                .with_occurrence(0, 4)
                .with_mask(false),
            Entity::new("PERSON_2", EntityType::Person, "Ann").with_occurrence(5, 8),
        ];

        let present = remap_entities(&mut entities, &mapping);
        assert_eq!(present, 1);
        assert_eq!(
            entities[0].occurrences,
            vec![Occurrence::new(11, 15), Occurrence::new(23, 27)]
        );
        assert!(!entities[0].should_mask);
        assert!(entities[1].occurrences.is_empty());
    }
}
