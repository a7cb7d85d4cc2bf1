//! Entities: types, merge, modifiers and overlap priority

pub mod types;
pub mod merge;
pub mod modifier;
pub mod priority;

pub use types::{ClassifiedSpan, Entity, EntityType, KnownEntity, Modifier, ModifierAction, Occurrence};
pub use merge::{spans_to_entities, EntityMerger};
pub use modifier::{effective_mask, modifier_for, sanitize_modifiers};
pub use priority::{placed_spans, resolve_overlaps, PlacedSpan};
