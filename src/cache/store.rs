//! Block output cache.
//!
//! Holds rendered block variants keyed by block id and resolved contexts,
//! with LRU eviction bounded by configuration.

use std::sync::RwLock;

use lru::LruCache;
use metrics::counter;

use super::config::CacheConfig;
use super::keys::BlockCacheKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

pub(crate) const METRIC_BLOCK_CACHE_HIT: &str = "curated_block_cache_hit_total";
pub(crate) const METRIC_BLOCK_CACHE_MISS: &str = "curated_block_cache_miss_total";
pub(crate) const METRIC_BLOCK_CACHE_EVICT: &str = "curated_block_cache_evict_total";

pub struct BlockCache<V> {
    entries: RwLock<LruCache<BlockCacheKey, V>>,
}

impl<V: Clone> BlockCache<V> {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.block_limit_non_zero())),
        }
    }

    pub fn get(&self, key: &BlockCacheKey) -> Option<V> {
        let value = rw_write(&self.entries, SOURCE, "get").get(key).cloned();
        match value {
            Some(_) => counter!(METRIC_BLOCK_CACHE_HIT).increment(1),
            None => counter!(METRIC_BLOCK_CACHE_MISS).increment(1),
        }
        value
    }

    /// Store a value, returning the key evicted to make room, if any.
    pub fn set(&self, key: BlockCacheKey, value: V) -> Option<BlockCacheKey> {
        let displaced = rw_write(&self.entries, SOURCE, "set").push(key.clone(), value);
        match displaced {
            Some((displaced_key, _)) if displaced_key != key => {
                counter!(METRIC_BLOCK_CACHE_EVICT).increment(1);
                Some(displaced_key)
            }
            _ => None,
        }
    }

    pub fn invalidate(&self, key: &BlockCacheKey) -> bool {
        rw_write(&self.entries, SOURCE, "invalidate")
            .pop(key)
            .is_some()
    }

    pub fn entry_count(&self) -> usize {
        rw_read(&self.entries, SOURCE, "entry_count").len()
    }
}
