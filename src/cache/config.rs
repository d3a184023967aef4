//! Block cache configuration.

use std::num::NonZeroUsize;

const DEFAULT_BLOCK_LIMIT: usize = 256;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Cache rendered blocks between requests.
    pub enabled: bool,
    /// Maximum cached block variants before LRU eviction.
    pub block_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            block_limit: DEFAULT_BLOCK_LIMIT,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            block_limit: settings.block_limit,
        }
    }
}

impl CacheConfig {
    /// Returns the block limit as NonZeroUsize, clamping to 1 if zero.
    pub fn block_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.block_limit).unwrap_or(NonZeroUsize::MIN)
    }
}
