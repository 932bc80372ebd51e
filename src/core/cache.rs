//! In-memory LRU cache of fetched pages
//!
//! Several schedule rows can point at the same boxscore page (duplicate
//! listings, neutral-site rematches). The cache keeps the parsed outcome for
//! each URL so one run never fetches a page twice. Failed outcomes are cached
//! too: a page that 404'd once will 404 again within the same run.

use lru::LruCache;
use std::num::NonZeroUsize;

pub const DEFAULT_PAGE_CAPACITY: usize = 512;

/// LRU cache keyed by absolute page URL.
pub struct PageCache<V> {
    pages: LruCache<String, V>,
    hits: usize,
    misses: usize,
}

impl<V: Clone> PageCache<V> {
    /// Create a cache holding up to `capacity` pages (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            pages: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a page, counting the hit or miss.
    pub fn get(&mut self, url: &str) -> Option<V> {
        match self.pages.get(url) {
            Some(value) => {
                self.hits += 1;
                Some(value.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn put(&mut self, url: impl Into<String>, value: V) {
        self.pages.put(url.into(), value);
    }

    /// Return the cached value for `url`, or compute, cache and return it.
    pub async fn get_or_insert_with<F, Fut>(&mut self, url: &str, load: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = V>,
    {
        if let Some(value) = self.get(url) {
            return value;
        }
        let value = load().await;
        self.put(url, value.clone());
        value
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

impl<V: Clone> Default for PageCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_CAPACITY)
    }
}
