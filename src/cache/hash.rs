//! Content hashes used as cache keys.
//!
//! `DefaultHasher` with the default keys is deterministic within a build,
//! which is all an in-memory cache needs.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::entity::{Entity, Modifier};
use crate::mapping::DocumentTree;

pub fn text_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Label, type, mask flag and occurrence count of every entity, in order
pub fn entities_hash(entities: &[Entity]) -> u64 {
    let mut hasher = DefaultHasher::new();
    entities.len().hash(&mut hasher);
    for e in entities {
        e.label.hash(&mut hasher);
        e.entity_type.hash(&mut hasher);
        e.should_mask.hash(&mut hasher);
        e.occurrences.len().hash(&mut hasher);
    }
    hasher.finish()
}

pub fn modifiers_hash(modifiers: &[Modifier]) -> u64 {
    let mut hasher = DefaultHasher::new();
    modifiers.len().hash(&mut hasher);
    for m in modifiers {
        m.id.hash(&mut hasher);
        m.entity.hash(&mut hasher);
        m.action.hash(&mut hasher);
        m.label.hash(&mut hasher);
    }
    hasher.finish()
}

/// Kind, text and position of every node in the tree
pub fn document_hash<T: DocumentTree + ?Sized>(root: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    root.walk(&mut |node| {
        node.kind.hash(&mut hasher);
        node.text.hash(&mut hasher);
        node.pos.hash(&mut hasher);
        node.depth.hash(&mut hasher);
    });
    hasher.finish()
}

/// Fold several hashes into one
pub fn combine(parts: &[u64]) -> u64 {
    let mut hasher = DefaultHasher::new();
    parts.hash(&mut hasher);
    hasher.finish()
}

/// `"{conversation}:{hash:016x}"`
pub fn cache_key(conversation_id: &str, hash: u64) -> String {
    format!("{}:{:016x}", conversation_id, hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityType, ModifierAction};
    use crate::mapping::DocNode;

    #[test]
    fn test_entities_hash_tracks_mask_flag() {
        let a = vec![Entity::new("PERSON_1", EntityType::Person, "John").with_occurrence(0, 4)];
        let mut b = a.clone();
        assert_eq!(entities_hash(&a), entities_hash(&b));
        b[0].should_mask = false;
        assert_ne!(entities_hash(&a), entities_hash(&b));
    }

    #[test]
    fn test_modifiers_hash_tracks_action() {
        let a = vec![Modifier::new("m1", "John", ModifierAction::Mask)];
        let b = vec![Modifier::new("m1", "John", ModifierAction::Ignore)];
        assert_ne!(modifiers_hash(&a), modifiers_hash(&b));
    }

    #[test]
    fn test_document_hash_tracks_text_and_structure() {
        let one = DocNode::doc(vec![DocNode::para_text("Hi John")]);
        let same = DocNode::doc(vec![DocNode::para_text("Hi John")]);
        let split = DocNode::doc(vec![DocNode::para_text("Hi"), DocNode::para_text("John")]);
        assert_eq!(document_hash(&one), document_hash(&same));
        assert_ne!(document_hash(&one), document_hash(&split));
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(cache_key("conv-1", 255), "conv-1:00000000000000ff");
    }
}
