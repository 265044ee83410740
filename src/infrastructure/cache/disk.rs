//! Disk cache persisting encoded image bytes across sessions.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};

use crate::domain::errors::{LoadError, LoadResult};
use crate::domain::ports::DiskCachePort;

/// Maximum disk cache size in bytes (256 MB default).
pub const DEFAULT_MAX_DISK_CACHE_BYTES: u64 = 256 * 1024 * 1024;

const ENTRY_EXTENSION: &str = "img";

/// Size-bounded byte cache, one file per key under a cache directory.
///
/// When the cache grows past its bound, the least recently accessed entries
/// are removed until roughly a tenth of the bound is free again.
pub struct DiskImageCache {
    cache_dir: PathBuf,
    max_bytes: u64,
    current_bytes: AtomicU64,
    entry_count: AtomicUsize,
}

impl DiskImageCache {
    /// Creates a new disk cache in the specified directory, scanning any
    /// existing entries into the size accounting.
    ///
    /// # Errors
    /// Returns an error if the cache directory cannot be created or read.
    pub async fn new(cache_dir: PathBuf, max_bytes: u64) -> LoadResult<Self> {
        fs::create_dir_all(&cache_dir)
            .await
            .map_err(|e| LoadError::io(format!("failed to create cache dir: {e}")))?;

        let mut total_bytes = 0u64;
        let mut count = 0usize;

        let mut entries = fs::read_dir(&cache_dir)
            .await
            .map_err(|e| LoadError::io(format!("failed to read cache dir: {e}")))?;

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION)
                && let Ok(meta) = entry.metadata().await
            {
                total_bytes += meta.len();
                count += 1;
            }
        }

        let cache = Self {
            cache_dir,
            max_bytes,
            current_bytes: AtomicU64::new(total_bytes),
            entry_count: AtomicUsize::new(count),
        };

        cache.cleanup_if_needed().await;

        Ok(cache)
    }

    /// Creates a cache in the platform cache directory.
    ///
    /// # Errors
    /// Returns an error if the cache directory cannot be created.
    pub async fn default_location() -> LoadResult<Self> {
        Self::new(default_cache_dir(), DEFAULT_MAX_DISK_CACHE_BYTES).await
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{key}.{ENTRY_EXTENSION}"))
    }

    /// Returns the current cache size in bytes.
    #[must_use]
    pub fn current_bytes(&self) -> u64 {
        self.current_bytes.load(Ordering::Relaxed)
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entry_count.load(Ordering::Relaxed)
    }

    /// Returns true if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes least-recently-accessed entries while over the size bound.
    async fn cleanup_if_needed(&self) {
        let current_bytes = self.current_bytes();
        if current_bytes <= self.max_bytes {
            return;
        }

        debug!(
            current_bytes = current_bytes,
            max_bytes = self.max_bytes,
            "Disk cache over limit, cleaning up"
        );

        let Ok(mut entries) = fs::read_dir(&self.cache_dir).await else {
            return;
        };

        let mut files: Vec<(PathBuf, std::time::SystemTime, u64)> = Vec::new();

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != ENTRY_EXTENSION) {
                continue;
            }

            if let Ok(meta) = entry.metadata().await {
                let accessed = meta.accessed().unwrap_or(std::time::SystemTime::UNIX_EPOCH);
                files.push((path, accessed, meta.len()));
            }
        }

        files.sort_by_key(|(_, time, _)| *time);

        let mut freed_bytes = 0u64;
        let mut freed_count = 0usize;
        let target = current_bytes - self.max_bytes + (self.max_bytes / 10);

        for (path, _, size) in files {
            if freed_bytes >= target {
                break;
            }

            if let Err(e) = fs::remove_file(&path).await {
                warn!(path = %path.display(), error = %e, "Failed to remove old cache entry");
            } else {
                debug!(path = %path.display(), "Removed old cache entry");
                freed_bytes += size;
                freed_count += 1;
            }
        }
        self.current_bytes.fetch_sub(freed_bytes, Ordering::Relaxed);
        self.entry_count.fetch_sub(freed_count, Ordering::Relaxed);

        debug!(
            freed_bytes = freed_bytes,
            freed_count = freed_count,
            "Disk cache cleanup complete"
        );
    }
}

impl std::fmt::Debug for DiskImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskImageCache")
            .field("cache_dir", &self.cache_dir)
            .field("max_bytes", &self.max_bytes)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl DiskCachePort for DiskImageCache {
    async fn get_bytes(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(key);
        if let Ok(bytes) = fs::read(&path).await {
            trace!(key = key, path = %path.display(), "Disk cache hit");
            Some(bytes)
        } else {
            trace!(key = key, "Disk cache miss");
            None
        }
    }

    async fn put_bytes(&self, key: &str, bytes: &[u8]) -> LoadResult<()> {
        let path = self.entry_path(key);

        let old_size = fs::metadata(&path).await.map(|m| m.len()).ok();

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| LoadError::io(format!("failed to create cache entry: {e}")))?;

        file.write_all(bytes)
            .await
            .map_err(|e| LoadError::io(format!("failed to write cache entry: {e}")))?;

        file.flush()
            .await
            .map_err(|e| LoadError::io(format!("failed to flush cache entry: {e}")))?;

        let new_size = bytes.len() as u64;
        if let Some(old) = old_size {
            if new_size > old {
                self.current_bytes
                    .fetch_add(new_size - old, Ordering::Relaxed);
            } else {
                self.current_bytes
                    .fetch_sub(old - new_size, Ordering::Relaxed);
            }
        } else {
            self.current_bytes.fetch_add(new_size, Ordering::Relaxed);
            self.entry_count.fetch_add(1, Ordering::Relaxed);
        }

        debug!(key = key, size = bytes.len(), "Stored entry in disk cache");

        self.cleanup_if_needed().await;

        Ok(())
    }

    async fn contains(&self, key: &str) -> bool {
        fs::try_exists(&self.entry_path(key)).await.unwrap_or(false)
    }

    async fn evict(&self, key: &str) {
        let path = self.entry_path(key);
        let size = fs::metadata(&path).await.map(|m| m.len()).ok();
        if let Err(e) = fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(key = key, error = %e, "Failed to evict disk cache entry");
            }
        } else if let Some(s) = size {
            self.current_bytes.fetch_sub(s, Ordering::Relaxed);
            self.entry_count.fetch_sub(1, Ordering::Relaxed);
            debug!(key = key, "Evicted disk cache entry");
        }
    }

    async fn clear(&self) -> LoadResult<()> {
        let mut entries = fs::read_dir(&self.cache_dir)
            .await
            .map_err(|e| LoadError::io(format!("failed to read cache dir: {e}")))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| LoadError::io(format!("failed to read entry: {e}")))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION)
                && fs::remove_file(&path).await.is_err()
            {
                warn!(path = %path.display(), "Failed to remove cache entry");
            }
        }
        self.current_bytes.store(0, Ordering::Relaxed);
        self.entry_count.store(0, Ordering::Relaxed);
        debug!("Cleared disk cache");
        Ok(())
    }
}

/// Returns the default cache directory path.
fn default_cache_dir() -> PathBuf {
    directories::ProjectDirs::from("io", "pixfetch", "pixfetch").map_or_else(
        || std::env::temp_dir().join("pixfetch").join("cache"),
        |dirs| dirs.cache_dir().join("images"),
    )
}
