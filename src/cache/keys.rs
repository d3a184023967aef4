//! Cache key definitions.

use std::fmt;

use super::metadata::CacheContext;

/// A cache context paired with its value for the current request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolvedContext {
    pub context: CacheContext,
    pub value: String,
}

impl ResolvedContext {
    pub fn new(context: CacheContext, value: impl Into<String>) -> Self {
        Self {
            context,
            value: value.into(),
        }
    }
}

/// Identifies one cached variant of a block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockCacheKey {
    pub block: &'static str,
    pub contexts: Vec<ResolvedContext>,
}

impl BlockCacheKey {
    /// Contexts are sorted so declaration order does not split entries.
    pub fn new(block: &'static str, mut contexts: Vec<ResolvedContext>) -> Self {
        contexts.sort();
        Self { block, contexts }
    }
}

impl fmt::Display for BlockCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.block)?;
        for resolved in &self.contexts {
            write!(f, ":{}={}", resolved.context.name(), resolved.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_order_does_not_matter() {
        let a = BlockCacheKey::new(
            "block",
            vec![
                ResolvedContext::new(CacheContext::User, "4"),
                ResolvedContext::new(CacheContext::Url, "/"),
            ],
        );
        let b = BlockCacheKey::new(
            "block",
            vec![
                ResolvedContext::new(CacheContext::Url, "/"),
                ResolvedContext::new(CacheContext::User, "4"),
            ],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn display_lists_context_values() {
        let key = BlockCacheKey::new(
            "preferred_category",
            vec![ResolvedContext::new(CacheContext::PreferredTaxonomy, "7_3")],
        );
        assert_eq!(key.to_string(), "preferred_category:preferred_taxonomy=7_3");
    }

    #[test]
    fn different_values_are_distinct_keys() {
        let a = BlockCacheKey::new(
            "preferred_category",
            vec![ResolvedContext::new(CacheContext::PreferredTaxonomy, "7_3")],
        );
        let b = BlockCacheKey::new(
            "preferred_category",
            vec![ResolvedContext::new(CacheContext::PreferredTaxonomy, "3_7")],
        );
        assert_ne!(a, b);
    }
}
