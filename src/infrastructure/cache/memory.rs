//! In-memory LRU cache of decoded images.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::domain::entities::{MemoryCacheKey, RenderedImage};
use crate::domain::ports::MemoryCachePort;

/// Default maximum number of images to cache in memory.
pub const DEFAULT_MEMORY_CACHE_CAPACITY: usize = 64;

/// Bounded LRU cache for decoded images, keyed by [`MemoryCacheKey`].
/// Thread-safe and optimized for frequent reads.
pub struct MemoryImageCache {
    cache: Arc<RwLock<LruCache<MemoryCacheKey, RenderedImage>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryImageCache {
    /// Creates a new cache with the specified capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(RwLock::new(LruCache::new(cap))),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Creates a new cache with the default capacity.
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_MEMORY_CACHE_CAPACITY)
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: self.len(),
        }
    }
}

impl Default for MemoryImageCache {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl std::fmt::Debug for MemoryImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryImageCache")
            .field("size", &self.len())
            .finish_non_exhaustive()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub size: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.hit_rate, self.hits, self.misses
        )
    }
}

#[async_trait::async_trait]
impl MemoryCachePort for MemoryImageCache {
    async fn get(&self, key: &MemoryCacheKey) -> Option<RenderedImage> {
        let mut cache = self.cache.write().await;
        if let Some(image) = cache.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Memory cache hit");
            Some(image.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Memory cache miss");
            None
        }
    }

    async fn peek(&self, key: &MemoryCacheKey) -> Option<RenderedImage> {
        let cache = self.cache.read().await;
        cache.peek(key).cloned()
    }

    async fn put(&self, key: MemoryCacheKey, image: RenderedImage) {
        let mut cache = self.cache.write().await;
        debug!(key = %key, "Storing image in memory cache");
        cache.put(key, image);
    }

    async fn evict(&self, key: &MemoryCacheKey) {
        let mut cache = self.cache.write().await;
        if cache.pop(key).is_some() {
            debug!(key = %key, "Evicted image from memory cache");
        }
    }

    fn len(&self) -> usize {
        // Best-effort under concurrent writers
        let cache = self.cache.try_read();
        cache.map(|c| c.len()).unwrap_or(0)
    }

    async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.clear();
        debug!("Cleared memory image cache");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_image() -> RenderedImage {
        RenderedImage::new(image::DynamicImage::new_rgb8(10, 10))
    }

    #[tokio::test]
    async fn test_cache_put_and_get() {
        let cache = MemoryImageCache::new(10);
        let key = MemoryCacheKey::new("slot1");

        cache.put(key.clone(), test_image()).await;
        let retrieved = cache.get(&key).await;

        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().width(), 10);
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let cache = MemoryImageCache::new(10);
        let result = cache.get(&MemoryCacheKey::new("nonexistent")).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_cache_eviction() {
        let cache = MemoryImageCache::new(2);

        let key1 = MemoryCacheKey::new("slot1");
        let key2 = MemoryCacheKey::new("slot2");
        let key3 = MemoryCacheKey::new("slot3");

        cache.put(key1.clone(), test_image()).await;
        cache.put(key2.clone(), test_image()).await;
        cache.put(key3.clone(), test_image()).await;

        // key1 is the LRU entry
        assert!(cache.get(&key1).await.is_none());
        assert!(cache.get(&key2).await.is_some());
        assert!(cache.get(&key3).await.is_some());
    }

    #[tokio::test]
    async fn test_cache_stats() {
        let cache = MemoryImageCache::new(10);
        let key = MemoryCacheKey::new("slot1");

        cache.put(key.clone(), test_image()).await;

        let _ = cache.get(&key).await;
        let _ = cache.get(&MemoryCacheKey::new("missing")).await;

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[tokio::test]
    async fn test_peek_does_not_promote() {
        let cache = MemoryImageCache::new(2);

        let key1 = MemoryCacheKey::new("slot1");
        let key2 = MemoryCacheKey::new("slot2");

        cache.put(key1.clone(), test_image()).await;
        cache.put(key2.clone(), test_image()).await;

        let _ = cache.peek(&key1).await;

        // key1 stays least-recently-used and falls out
        cache.put(MemoryCacheKey::new("slot3"), test_image()).await;
        assert!(cache.peek(&key1).await.is_none());
    }

    #[tokio::test]
    async fn test_peek_does_not_count_stats() {
        let cache = MemoryImageCache::new(2);
        let _ = cache.peek(&MemoryCacheKey::new("missing")).await;
        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, 0);
    }
}
