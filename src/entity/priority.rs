//! Overlap resolution by entity type priority.

use super::types::{Entity, EntityType, Occurrence};

/// One entity occurrence competing for a plain-text range
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSpan {
    pub entity_index: usize,
    pub occurrence_index: usize,
    pub entity_type: EntityType,
    pub range: Occurrence,
}

/// Every occurrence of every entity, in entity order
pub fn placed_spans(entities: &[Entity]) -> Vec<PlacedSpan> {
    entities
        .iter()
        .enumerate()
        .flat_map(|(ei, entity)| {
            entity
                .occurrences
                .iter()
                .enumerate()
                .filter(|(_, occ)| !occ.is_empty())
                .map(move |(oi, occ)| PlacedSpan {
                    entity_index: ei,
                    occurrence_index: oi,
                    entity_type: entity.entity_type.clone(),
                    range: *occ,
                })
        })
        .collect()
}

/// Keep the winning span wherever ranges overlap.
///
/// Higher type priority wins, then the longer span, then the earlier one.
/// The result is sorted by start offset and contains no overlaps.
pub fn resolve_overlaps(mut spans: Vec<PlacedSpan>) -> Vec<PlacedSpan> {
    spans.sort_by(|a, b| {
        b.entity_type
            .priority()
            .cmp(&a.entity_type.priority())
            .then(b.range.len().cmp(&a.range.len()))
            .then(a.range.start.cmp(&b.range.start))
    });

    let mut kept: Vec<PlacedSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        if kept.iter().all(|k| !k.range.overlaps(&span.range)) {
            kept.push(span);
        }
    }

    kept.sort_by_key(|s| (s.range.start, s.range.end));
    kept
}
