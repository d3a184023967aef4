//! Bidirectional cache registry.
//!
//! Tracks which cache tags each cached block carries so that tag
//! invalidation can find every affected entry.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use super::keys::BlockCacheKey;
use super::lock::{rw_read, rw_write};
use super::metadata::CacheTag;

const SOURCE: &str = "cache::registry";

/// Tracks tag → cache_keys and cache_key → tags mappings.
pub struct CacheRegistry {
    tag_to_keys: RwLock<HashMap<CacheTag, HashSet<BlockCacheKey>>>,
    key_to_tags: RwLock<HashMap<BlockCacheKey, HashSet<CacheTag>>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self {
            tag_to_keys: RwLock::new(HashMap::new()),
            key_to_tags: RwLock::new(HashMap::new()),
        }
    }

    /// Register a cache entry with the tags it carries, replacing any
    /// previous registration for the same key.
    pub fn register(&self, cache_key: BlockCacheKey, tags: HashSet<CacheTag>) {
        self.unregister(&cache_key);

        let mut t2k = rw_write(&self.tag_to_keys, SOURCE, "register.tag_to_keys");
        let mut k2t = rw_write(&self.key_to_tags, SOURCE, "register.key_to_tags");

        for tag in &tags {
            t2k.entry(tag.clone()).or_default().insert(cache_key.clone());
        }
        k2t.insert(cache_key, tags);
    }

    /// Remove a cache key and clean up tag mappings.
    ///
    /// Called when a cache entry is evicted or invalidated.
    pub fn unregister(&self, cache_key: &BlockCacheKey) {
        let mut t2k = rw_write(&self.tag_to_keys, SOURCE, "unregister.tag_to_keys");
        let mut k2t = rw_write(&self.key_to_tags, SOURCE, "unregister.key_to_tags");

        if let Some(tags) = k2t.remove(cache_key) {
            for tag in tags {
                if let Some(keys) = t2k.get_mut(&tag) {
                    keys.remove(cache_key);
                    if keys.is_empty() {
                        t2k.remove(&tag);
                    }
                }
            }
        }
    }

    /// Remove every key carrying any of `tags`, returning the removed keys.
    pub fn take_keys_for_tags(&self, tags: &[CacheTag]) -> HashSet<BlockCacheKey> {
        let affected: HashSet<BlockCacheKey> = {
            let t2k = rw_read(&self.tag_to_keys, SOURCE, "take_keys_for_tags");
            tags.iter()
                .filter_map(|tag| t2k.get(tag))
                .flat_map(|keys| keys.iter().cloned())
                .collect()
        };

        for key in &affected {
            self.unregister(key);
        }

        affected
    }

    pub fn tag_count(&self) -> usize {
        rw_read(&self.tag_to_keys, SOURCE, "tag_count").len()
    }

    pub fn key_count(&self) -> usize {
        rw_read(&self.key_to_tags, SOURCE, "key_count").len()
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}
