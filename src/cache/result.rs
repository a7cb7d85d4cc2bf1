//! ResultCache: entities, mappings and decorations per conversation.

use super::bounded::BoundedCache;
use super::hash::cache_key;
use crate::config::CacheConfig;
use crate::decorations::Decoration;
use crate::entity::Entity;
use crate::mapping::PositionMapping;

/// Three independent bounded caches keyed by `(conversation, content hash)`.
///
/// Single writer: only the owning session mutates it. Writes never fail.
#[derive(Debug, Clone)]
pub struct ResultCache {
    entities: BoundedCache<Vec<Entity>>,
    mappings: BoundedCache<PositionMapping>,
    decorations: BoundedCache<Vec<Decoration>>,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl ResultCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entities: BoundedCache::new(config.capacity),
            mappings: BoundedCache::new(config.capacity),
            decorations: BoundedCache::new(config.capacity),
        }
    }

    pub fn get_entities(&self, conversation_id: &str, hash: u64) -> Option<&Vec<Entity>> {
        self.entities.get(&cache_key(conversation_id, hash))
    }

    pub fn put_entities(&mut self, conversation_id: &str, hash: u64, entities: Vec<Entity>, now_ms: u64) {
        self.entities.insert(&cache_key(conversation_id, hash), entities, now_ms);
    }

    pub fn get_mapping(&self, conversation_id: &str, hash: u64) -> Option<&PositionMapping> {
        self.mappings.get(&cache_key(conversation_id, hash))
    }

    pub fn put_mapping(&mut self, conversation_id: &str, hash: u64, mapping: PositionMapping, now_ms: u64) {
        self.mappings.insert(&cache_key(conversation_id, hash), mapping, now_ms);
    }

    pub fn get_decorations(&self, conversation_id: &str, hash: u64) -> Option<&Vec<Decoration>> {
        self.decorations.get(&cache_key(conversation_id, hash))
    }

    pub fn put_decorations(&mut self, conversation_id: &str, hash: u64, decorations: Vec<Decoration>, now_ms: u64) {
        self.decorations.insert(&cache_key(conversation_id, hash), decorations, now_ms);
    }

    /// Drop everything cached for one conversation.
    ///
    /// Ids may contain `:`, so the conversation part is everything before the
    /// last separator and must match exactly.
    pub fn clear_conversation(&mut self, conversation_id: &str) -> usize {
        let owned = |key: &str| key.rsplit_once(':').map_or(false, |(conv, _)| conv == conversation_id);
        self.entities.remove_where(owned)
            + self.mappings.remove_where(owned)
            + self.decorations.remove_where(owned)
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.mappings.clear();
        self.decorations.clear();
    }

    /// Entry counts: (entities, mappings, decorations)
    pub fn sizes(&self) -> (usize, usize, usize) {
        (self.entities.len(), self.mappings.len(), self.decorations.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityType;

    #[test]
    fn test_caches_are_independent_and_bounded() {
        let mut cache = ResultCache::new(&CacheConfig { capacity: 2 });
        for h in 0..3u64 {
            cache.put_entities("c1", h, vec![Entity::new("P", EntityType::Person, "x")], h);
        }
        cache.put_mapping("c1", 0, PositionMapping::default(), 0);

        assert_eq!(cache.sizes(), (2, 1, 0));
        assert!(cache.get_entities("c1", 0).is_none());
        assert!(cache.get_entities("c1", 2).is_some());
        assert!(cache.get_mapping("c1", 0).is_some());
    }

    #[test]
    fn test_conversations_do_not_collide() {
        let mut cache = ResultCache::default();
        cache.put_entities("c1", 7, vec![], 0);
        assert!(cache.get_entities("c2", 7).is_none());

        cache.put_decorations("c1", 1, vec![], 0);
        cache.put_decorations("c2", 1, vec![], 0);
        assert_eq!(cache.clear_conversation("c1"), 2);
        assert!(cache.get_decorations("c2", 1).is_some());
    }

    #[test]
    fn test_clear_conversation_matches_whole_id() {
        let mut cache = ResultCache::default();
        cache.put_entities("a", 1, vec![], 0);
        cache.put_entities("a:b", 1, vec![], 0);
        cache.put_mapping("a:b", 2, PositionMapping::default(), 0);

        assert_eq!(cache.clear_conversation("a"), 1);
        assert!(cache.get_entities("a", 1).is_none());
        assert!(cache.get_entities("a:b", 1).is_some());
        assert!(cache.get_mapping("a:b", 2).is_some());

        assert_eq!(cache.clear_conversation("a:b"), 2);
        assert_eq!(cache.sizes(), (0, 0, 0));
    }
}
