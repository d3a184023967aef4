//! Cache contexts, tags and block output caching.
//!
//! - **Context keys**: deterministic strings partitioning cached output
//!   by a viewer's interests (`context`).
//! - **Metadata**: tags and contexts each block declares (`metadata`).
//! - **Block cache**: LRU store of rendered block variants, invalidated
//!   by tag through the registry.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! block_limit = 256
//! ```

mod config;
mod context;
mod keys;
mod lock;
mod metadata;
mod registry;
mod store;

pub use config::CacheConfig;
pub use context::{CacheContextKey, CacheKeyDeriver, KeyMode, NO_PREFERENCES_KEY};
pub use keys::{BlockCacheKey, ResolvedContext};
pub use metadata::{CacheContext, CacheTag, CacheableMetadata};
pub use registry::CacheRegistry;
pub use store::BlockCache;

pub(crate) use store::{METRIC_BLOCK_CACHE_EVICT, METRIC_BLOCK_CACHE_HIT, METRIC_BLOCK_CACHE_MISS};
