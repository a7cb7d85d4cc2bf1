//! Bounded result caches and the content hashes that key them

pub mod bounded;
pub mod hash;
pub mod result;

pub use bounded::{BoundedCache, CacheEntry};
pub use hash::{cache_key, combine, document_hash, entities_hash, modifiers_hash, text_hash};
pub use result::ResultCache;
