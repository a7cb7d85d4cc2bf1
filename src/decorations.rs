//! Highlight data for the editor.
//!
//! Produces inline ranges in structured coordinates; painting them is the
//! host's job. Modifier highlights take precedence: an entity whose surface
//! text carries a modifier is drawn only through the modifier.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::entity::{effective_mask, placed_spans, resolve_overlaps, Entity, Modifier, ModifierAction};
use crate::mapping::{find_occurrences, PositionMapping};
use crate::text::CharText;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecorationKind {
    Entity {
        label: String,
        entity_type: String,
        text: String,
        masked: bool,
        entity_index: usize,
        occurrence_index: usize,
    },
    Modifier {
        modifier_id: String,
        entity: String,
        action: ModifierAction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

/// Inline range `[from, to)` in structured positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub from: usize,
    pub to: usize,
    #[serde(flatten)]
    pub kind: DecorationKind,
}

impl Decoration {
    pub fn is_modifier(&self) -> bool {
        matches!(self.kind, DecorationKind::Modifier { .. })
    }
}

fn is_word_boundary(chars: &CharText<'_>, idx: Option<usize>) -> bool {
    match idx.and_then(|i| chars.char_at(i)) {
        Some(c) => !(c.is_alphanumeric() || c == '_'),
        None => true,
    }
}

/// Entity and modifier decorations sorted by position
pub fn build_decorations(entities: &[Entity], modifiers: &[Modifier], mapping: &PositionMapping) -> Vec<Decoration> {
    let modified: HashSet<String> = modifiers
        .iter()
        .map(|m| m.entity.trim().to_lowercase())
        .collect();

    let spans = placed_spans(entities)
        .into_iter()
        .filter(|s| !modified.contains(&entities[s.entity_index].text.trim().to_lowercase()))
        .collect();

    let mut decorations: Vec<Decoration> = resolve_overlaps(spans)
        .into_iter()
        .filter_map(|span| {
            let (from, to) = mapping.structured_range(span.range.start, span.range.end)?;
            let entity = &entities[span.entity_index];
            Some(Decoration {
                from,
                to,
                kind: DecorationKind::Entity {
                    label: entity.label.clone(),
                    entity_type: entity.entity_type.to_string(),
                    text: entity.text.clone(),
                    masked: effective_mask(entity, modifiers),
                    entity_index: span.entity_index,
                    occurrence_index: span.occurrence_index,
                },
            })
        })
        .collect();

    let chars = CharText::new(mapping.plain_text());
    for modifier in modifiers {
        for occ in find_occurrences(mapping.plain_text(), &modifier.entity) {
            let whole_word = is_word_boundary(&chars, occ.start.checked_sub(1))
                && is_word_boundary(&chars, Some(occ.end));
            if !whole_word || !mapping.is_contiguous(occ.start, occ.end) {
                continue;
            }
            if let Some((from, to)) = mapping.structured_range(occ.start, occ.end) {
                decorations.push(Decoration {
                    from,
                    to,
                    kind: DecorationKind::Modifier {
                        modifier_id: modifier.id.clone(),
                        entity: modifier.entity.clone(),
                        action: modifier.action,
                        label: modifier.label.clone(),
                    },
                });
            }
        }
    }

    decorations.sort_by_key(|d| (d.from, d.to, d.is_modifier()));
    decorations
}
