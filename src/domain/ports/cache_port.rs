//! Port definitions for the two cache tiers.

use crate::domain::entities::{MemoryCacheKey, RenderedImage};
use crate::domain::errors::LoadResult;

/// Port for the in-memory cache of decoded images.
/// Implementations must be thread-safe.
#[async_trait::async_trait]
pub trait MemoryCachePort: Send + Sync {
    /// Attempts to get an image, promoting it in any recency order.
    async fn get(&self, key: &MemoryCacheKey) -> Option<RenderedImage>;

    /// Looks up an image without promoting it.
    async fn peek(&self, key: &MemoryCacheKey) -> Option<RenderedImage>;

    /// Stores an image. On return the image is resident under `key`.
    async fn put(&self, key: MemoryCacheKey, image: RenderedImage);

    /// Removes an image from the cache.
    async fn evict(&self, key: &MemoryCacheKey);

    /// Returns the current number of cached images.
    fn len(&self) -> usize;

    /// Returns true if the cache is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all images from the cache.
    async fn clear(&self);
}

/// Port for the persistent byte-level cache.
/// Implementations must be thread-safe.
#[async_trait::async_trait]
pub trait DiskCachePort: Send + Sync {
    /// Reads the raw bytes stored under `key`, if present.
    async fn get_bytes(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores raw bytes under `key`. On `Ok` the bytes are durably written.
    ///
    /// # Errors
    /// Returns an error if the entry cannot be created or written.
    async fn put_bytes(&self, key: &str, bytes: &[u8]) -> LoadResult<()>;

    /// Returns true if an entry exists under `key`.
    async fn contains(&self, key: &str) -> bool;

    /// Removes the entry under `key`.
    async fn evict(&self, key: &str);

    /// Removes every entry.
    ///
    /// # Errors
    /// Returns an error if the cache store cannot be enumerated.
    async fn clear(&self) -> LoadResult<()>;
}
