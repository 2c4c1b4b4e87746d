//! Content-addressed prompt cache using moka
//!
//! Entries are keyed by the hash of the request that produced them and expire
//! after a fixed time-to-live, so an identical request inside the window skips
//! the file reads while any change to the request misses.

use moka::future::Cache;
use o11n_plan::ContentHash;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Default time-to-live of an assembled prompt
pub const DEFAULT_TTL: Duration = Duration::from_millis(2000);

/// Default number of prompts kept
pub const DEFAULT_CAPACITY: u64 = 64;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// Assembled prompts by request hash
#[derive(Debug, Clone)]
pub struct PromptCache {
    inner: Cache<ContentHash, Arc<str>>,
    ttl: Duration,
}

impl PromptCache {
    /// Create cache with time-based expiration
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
            ttl,
        }
    }

    /// Configured time-to-live
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached prompt for `key`, if still live
    pub async fn get(&self, key: &ContentHash) -> Option<Arc<str>> {
        self.inner.get(key).await
    }

    /// Store a prompt
    pub async fn insert(&self, key: ContentHash, prompt: Arc<str>) {
        self.inner.insert(key, prompt).await;
    }

    /// Return the cached prompt or build, store and return a new one
    pub async fn get_or_build<F, Fut>(&self, key: ContentHash, build: F) -> Arc<str>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = String>,
    {
        if let Some(cached) = self.get(&key).await {
            tracing::trace!(key = %key.short(), "prompt cache hit");
            return cached;
        }

        let prompt: Arc<str> = build().await.into();
        self.insert(key, Arc::clone(&prompt)).await;
        prompt
    }

    /// Drop every entry
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Get cache statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }

    /// Run pending maintenance so `stats` is current
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}

impl Default for PromptCache {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}
