//! User modifiers: per-entity mask/unmask/ignore overrides.

use super::types::{Entity, Modifier, ModifierAction};

/// Modifier targeting `entity`, matched on label or surface text (case-insensitive)
pub fn modifier_for<'a>(entity: &Entity, modifiers: &'a [Modifier]) -> Option<&'a Modifier> {
    let label = entity.label.to_lowercase();
    let text = entity.text.trim().to_lowercase();
    modifiers.iter().rev().find(|m| {
        let target = m.entity.trim().to_lowercase();
        target == label || (!text.is_empty() && target == text)
    })
}

/// Whether `entity` ends up masked once modifiers are applied
pub fn effective_mask(entity: &Entity, modifiers: &[Modifier]) -> bool {
    match modifier_for(entity, modifiers).map(|m| m.action) {
        Some(ModifierAction::Mask) => true,
        Some(ModifierAction::Unmask) | Some(ModifierAction::Ignore) => false,
        None => entity.should_mask,
    }
}

/// Drop records that carry no target
pub fn sanitize_modifiers(modifiers: Vec<Modifier>) -> Vec<Modifier> {
    modifiers
        .into_iter()
        .filter(|m| !m.id.trim().is_empty() && !m.entity.trim().is_empty())
        .collect()
}
