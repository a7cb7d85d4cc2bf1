//! Insertion-ordered cache with a hard size bound.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    pub key: String,
    pub value: V,
    pub inserted_at: u64,
}

/// FIFO-evicting map. The oldest inserted key goes first once `capacity`
/// is reached; overwriting a key keeps its place in line.
#[derive(Debug, Clone)]
pub struct BoundedCache<V> {
    capacity: usize,
    entries: HashMap<String, CacheEntry<V>>,
    order: VecDeque<String>,
}

impl<V> BoundedCache<V> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key).map(|e| &e.value)
    }

    pub fn entry(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite. Returns the evicted key, if any.
    pub fn insert(&mut self, key: &str, value: V, now_ms: u64) -> Option<String> {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.value = value;
            entry.inserted_at = now_ms;
            return None;
        }

        let evicted = self.evict_if_needed();
        self.order.push_back(key.to_string());
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                key: key.to_string(),
                value,
                inserted_at: now_ms,
            },
        );
        evicted
    }

    fn evict_if_needed(&mut self) -> Option<String> {
        if self.entries.len() < self.capacity {
            return None;
        }
        let oldest = self.order.pop_front()?;
        self.entries.remove(&oldest);
        Some(oldest)
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        let entry = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(entry.value)
    }

    /// Drop every key matching `pred`. Returns how many were dropped.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&str) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| !pred(k.as_str()));
        self.order.retain(|k| !pred(k.as_str()));
        before - self.entries.len()
    }

    /// Keys from oldest to newest
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Requirement 1: capacity + 1 inserts evict exactly the first key
    // -------------------------------------------------------------------------
    #[test]
    fn test_capacity_bound_evicts_first() {
        let mut cache = BoundedCache::new(10);
        let mut evicted = Vec::new();
        for i in 0..11 {
            if let Some(k) = cache.insert(&format!("k{}", i), i, i as u64) {
                evicted.push(k);
            }
        }
        assert_eq!(cache.len(), 10);
        assert_eq!(evicted, vec!["k0".to_string()]);
        assert!(cache.get("k0").is_none());
        assert_eq!(cache.get("k10"), Some(&10));
        assert_eq!(cache.keys().next(), Some("k1"));
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Overwrite keeps the slot, get is pure
    // -------------------------------------------------------------------------
    #[test]
    fn test_overwrite_keeps_order() {
        let mut cache = BoundedCache::new(2);
        cache.insert("a", 1, 0);
        cache.insert("b", 2, 1);
        assert_eq!(cache.insert("a", 3, 2), None);
        assert_eq!(cache.get("a"), Some(&3));
        assert_eq!(cache.entry("a").map(|e| e.inserted_at), Some(2));

        // Reads do not refresh: "a" is still the oldest
        let _ = cache.get("a");
        assert_eq!(cache.insert("c", 4, 3), Some("a".to_string()));
    }

    #[test]
    fn test_remove_and_remove_where() {
        let mut cache = BoundedCache::new(5);
        cache.insert("conv1:1", 1, 0);
        cache.insert("conv1:2", 2, 0);
        cache.insert("conv2:1", 3, 0);
        assert_eq!(cache.remove("conv1:1"), Some(1));
        assert_eq!(cache.remove_where(|k| k.starts_with("conv1:")), 1);
        assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["conv2:1"]);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut cache = BoundedCache::new(0);
        cache.insert("a", 1, 0);
        cache.insert("b", 2, 0);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.capacity(), 1);
    }
}
