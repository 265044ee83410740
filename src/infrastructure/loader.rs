//! Async image loading orchestrator.
//!
//! Runs each request through a three-tier pipeline (memory cache -> disk
//! cache -> fetch + decode) and reports every completed execution as exactly
//! one [`ImageResult`], either returned directly or delivered on the
//! loader's event channel.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, Semaphore, mpsc};
use tracing::{debug, error, info, warn};

use crate::domain::entities::{
    DataSource, ErrorResult, ImageRequest, ImageResult, MemoryCacheKey, RenderedImage,
    RequestSource, SuccessResult,
};
use crate::domain::errors::{LoadError, LoadResult};
use crate::domain::ports::{DiskCachePort, ImageFetcherPort, MemoryCachePort};

use super::cache::{CacheStats, DEFAULT_MAX_DISK_CACHE_BYTES, DiskImageCache, MemoryImageCache};
use super::decode::decode_image;
use super::fetch::DefaultImageFetcher;

/// Opaque id correlating an enqueued request with its single delivered
/// event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Message sent when an enqueued request finishes.
#[derive(Debug, Clone)]
pub struct ImageLoadedEvent {
    /// The token returned by [`ImageLoader::enqueue`].
    pub token: RequestToken,
    /// The outcome of the request.
    pub result: ImageResult,
}

/// Configuration for the image loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageLoaderConfig {
    /// Maximum images in the memory cache.
    pub memory_cache_capacity: usize,
    /// Maximum disk cache size in bytes.
    pub disk_cache_max_bytes: u64,
    /// Maximum concurrent loads.
    pub max_concurrent_loads: usize,
    /// Fetch timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ImageLoaderConfig {
    fn default() -> Self {
        Self {
            memory_cache_capacity: 64,
            disk_cache_max_bytes: DEFAULT_MAX_DISK_CACHE_BYTES,
            max_concurrent_loads: 4,
            timeout_secs: 30,
        }
    }
}

impl ImageLoaderConfig {
    /// Fetch timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug)]
enum LoaderCommand {
    Load {
        token: RequestToken,
        request: ImageRequest,
    },
    Cancel {
        token: RequestToken,
    },
    CancelAll,
}

/// Orchestrates image loading from memory, disk, and fetchers.
pub struct ImageLoader {
    memory_cache: Arc<MemoryImageCache>,
    disk_cache: Arc<DiskImageCache>,
    fetcher: Arc<dyn ImageFetcherPort>,
    pending: Arc<RwLock<HashSet<RequestToken>>>,
    command_tx: mpsc::UnboundedSender<LoaderCommand>,
    next_token: AtomicU64,
    config: ImageLoaderConfig,
}

impl std::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// State for the background worker loop.
struct WorkerState {
    pipeline: Pipeline,
    pending: Arc<RwLock<HashSet<RequestToken>>>,
    event_tx: mpsc::UnboundedSender<ImageLoadedEvent>,
    semaphore: Arc<Semaphore>,
    command_rx: mpsc::UnboundedReceiver<LoaderCommand>,
}

impl ImageLoader {
    /// Creates a new loader with the given configuration, delivering events
    /// for enqueued requests on `event_tx`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        config: ImageLoaderConfig,
        event_tx: &mpsc::UnboundedSender<ImageLoadedEvent>,
        disk_cache: Arc<DiskImageCache>,
    ) -> LoadResult<Self> {
        let fetcher: Arc<dyn ImageFetcherPort> =
            Arc::new(DefaultImageFetcher::new(config.timeout())?);
        Ok(Self::with_fetcher(config, event_tx, disk_cache, fetcher))
    }

    /// Creates a loader over a caller-supplied fetcher.
    #[must_use]
    pub fn with_fetcher(
        config: ImageLoaderConfig,
        event_tx: &mpsc::UnboundedSender<ImageLoadedEvent>,
        disk_cache: Arc<DiskImageCache>,
        fetcher: Arc<dyn ImageFetcherPort>,
    ) -> Self {
        let memory_cache = Arc::new(MemoryImageCache::new(config.memory_cache_capacity));
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_loads.max(1)));
        let pending = Arc::new(RwLock::new(HashSet::new()));

        let worker = WorkerState {
            pipeline: Pipeline {
                memory_cache: memory_cache.clone(),
                disk_cache: disk_cache.clone(),
                fetcher: fetcher.clone(),
            },
            pending: pending.clone(),
            event_tx: event_tx.clone(),
            semaphore,
            command_rx,
        };

        tokio::spawn(Self::run_worker_loop(worker));

        Self {
            memory_cache,
            disk_cache,
            fetcher,
            pending,
            command_tx,
            next_token: AtomicU64::new(0),
            config,
        }
    }

    /// Creates a loader with default configuration and the default disk
    /// cache location.
    ///
    /// # Errors
    /// Returns an error if the disk cache or HTTP client cannot be created.
    pub async fn with_defaults(
        event_tx: mpsc::UnboundedSender<ImageLoadedEvent>,
    ) -> LoadResult<Self> {
        let disk_cache = Arc::new(DiskImageCache::default_location().await?);
        Self::new(ImageLoaderConfig::default(), &event_tx, disk_cache)
    }

    /// Worker loop handling queued requests, throttling, and cancellation.
    async fn run_worker_loop(mut state: WorkerState) {
        let mut queue: VecDeque<(RequestToken, ImageRequest)> = VecDeque::new();

        loop {
            tokio::select! {
                cmd = state.command_rx.recv() => {
                    match cmd {
                        Some(LoaderCommand::Load { token, request }) => {
                            state.pending.write().await.insert(token);
                            queue.push_back((token, request));
                        }
                        Some(LoaderCommand::Cancel { token }) => {
                            if let Some(pos) = queue.iter().position(|(t, _)| *t == token)
                                && let Some((token, request)) = queue.remove(pos)
                            {
                                Self::deliver_cancelled(&state, token, request).await;
                            }
                        }
                        Some(LoaderCommand::CancelAll) => {
                            while let Some((token, request)) = queue.pop_front() {
                                Self::deliver_cancelled(&state, token, request).await;
                            }
                        }
                        None => break,
                    }
                }
                Ok(permit) = state.semaphore.clone().acquire_owned(), if !queue.is_empty() => {
                    if let Some((token, request)) = queue.pop_front() {
                        let pipeline = state.pipeline.clone();
                        let pending = state.pending.clone();
                        let event_tx = state.event_tx.clone();

                        tokio::spawn(async move {
                            let result = pipeline.run(request).await;
                            pending.write().await.remove(&token);
                            let _ = event_tx.send(ImageLoadedEvent { token, result });
                            drop(permit);
                        });
                    }
                }
            }
        }
    }

    /// A cancelled queued request still produces its one event, carrying a
    /// cancellation-kind error.
    async fn deliver_cancelled(state: &WorkerState, token: RequestToken, request: ImageRequest) {
        state.pending.write().await.remove(&token);
        debug!(source = %request.source(), "Cancelled queued image load");
        let fallback = request.fallback_image().cloned();
        let result = ImageResult::Error(ErrorResult::new(fallback, request, LoadError::Cancelled));
        let _ = state.event_tx.send(ImageLoadedEvent { token, result });
    }

    /// Executes a request immediately on the calling task, bypassing the
    /// concurrency limit, and returns its outcome.
    pub async fn execute(&self, request: ImageRequest) -> ImageResult {
        self.pipeline().run(request).await
    }

    /// Queues a request for background execution. The outcome arrives as
    /// one [`ImageLoadedEvent`] on the loader's event channel.
    pub fn enqueue(&self, request: ImageRequest) -> RequestToken {
        let token = RequestToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        if let Err(e) = self.command_tx.send(LoaderCommand::Load { token, request }) {
            error!("Failed to send load request: {e}");
        }
        token
    }

    /// Queues several requests, e.g. to warm caches ahead of display.
    pub fn enqueue_batch(
        &self,
        requests: impl IntoIterator<Item = ImageRequest>,
    ) -> Vec<RequestToken> {
        requests.into_iter().map(|r| self.enqueue(r)).collect()
    }

    /// Cancels a queued request. Best-effort: a request already executing
    /// runs to completion and delivers its real outcome.
    pub fn cancel(&self, token: RequestToken) {
        if let Err(e) = self.command_tx.send(LoaderCommand::Cancel { token }) {
            error!("Failed to send cancel request: {e}");
        }
    }

    /// Cancels every queued request.
    pub fn cancel_all(&self) {
        if let Err(e) = self.command_tx.send(LoaderCommand::CancelAll) {
            error!("Failed to send cancel request: {e}");
        }
    }

    /// Returns true if the token's request is queued or executing.
    pub async fn is_loading(&self, token: RequestToken) -> bool {
        self.pending.read().await.contains(&token)
    }

    /// Returns the number of queued or executing requests.
    pub async fn pending_count(&self) -> usize {
        self.pending.read().await.len()
    }

    /// Looks up a memory cache slot without promoting it.
    pub async fn check_memory_cache(&self, key: &MemoryCacheKey) -> Option<RenderedImage> {
        self.memory_cache.peek(key).await
    }

    /// Returns memory cache statistics.
    #[must_use]
    pub fn memory_cache_stats(&self) -> CacheStats {
        self.memory_cache.stats()
    }

    /// Clears both cache tiers.
    pub async fn clear_caches(&self) {
        self.memory_cache.clear().await;
        if let Err(e) = self.disk_cache.clear().await {
            warn!(error = %e, "Failed to clear disk cache");
        }
        info!("Cleared image caches");
    }

    /// The loader's configuration.
    #[must_use]
    pub const fn config(&self) -> &ImageLoaderConfig {
        &self.config
    }

    fn pipeline(&self) -> Pipeline {
        Pipeline {
            memory_cache: self.memory_cache.clone(),
            disk_cache: self.disk_cache.clone(),
            fetcher: self.fetcher.clone(),
        }
    }
}

/// One execution's view of the pipeline collaborators.
#[derive(Clone)]
struct Pipeline {
    memory_cache: Arc<MemoryImageCache>,
    disk_cache: Arc<DiskImageCache>,
    fetcher: Arc<dyn ImageFetcherPort>,
}

/// Constituent fields of a success outcome, gathered tier by tier.
struct LoadOutcome {
    image: RenderedImage,
    data_source: DataSource,
    memory_cache_key: Option<MemoryCacheKey>,
    disk_cache_key: Option<String>,
}

impl Pipeline {
    /// Runs one request to completion and assembles its single result.
    async fn run(&self, request: ImageRequest) -> ImageResult {
        let is_placeholder_cached = match request.placeholder_memory_cache_key() {
            Some(key) => self.memory_cache.peek(key).await.is_some(),
            None => false,
        };

        match self.load(&request).await {
            Ok(outcome) => {
                let is_sampled = outcome.image.is_sampled();
                let mut success = SuccessResult::new(outcome.image, request, outcome.data_source)
                    .with_sampled(is_sampled)
                    .with_placeholder_cached(is_placeholder_cached);
                if let Some(key) = outcome.memory_cache_key {
                    success = success.with_memory_cache_key(key);
                }
                if let Some(key) = outcome.disk_cache_key {
                    success = success.with_disk_cache_key(key);
                }
                ImageResult::Success(success)
            }
            Err(load_error) => {
                debug!(source = %request.source(), error = %load_error, "Image load failed");
                let fallback = request.fallback_image().cloned();
                ImageResult::Error(ErrorResult::new(fallback, request, load_error))
            }
        }
    }

    async fn load(&self, request: &ImageRequest) -> LoadResult<LoadOutcome> {
        request.validate()?;

        let cache_key = MemoryCacheKey::from_source(request.source());
        let disk_key = cache_key.as_str().to_owned();

        if request.memory_cache_policy().read_enabled()
            && let Some(image) = self.memory_cache.get(&cache_key).await
        {
            return Ok(LoadOutcome {
                image,
                data_source: DataSource::MemoryCache,
                memory_cache_key: Some(cache_key),
                disk_cache_key: None,
            });
        }

        if request.disk_cache_policy().read_enabled()
            && let Some(bytes) = self.disk_cache.get_bytes(&disk_key).await
        {
            match decode_image(bytes.into(), request.target_size()).await {
                Ok(image) => {
                    let memory_cache_key = self.write_memory(request, &cache_key, &image).await;
                    return Ok(LoadOutcome {
                        image,
                        data_source: DataSource::DiskCache,
                        memory_cache_key,
                        disk_cache_key: Some(disk_key),
                    });
                }
                Err(load_error) => {
                    // Corrupt entry: drop it and fall through to a fresh fetch.
                    warn!(key = %disk_key, error = %load_error, "Evicting undecodable disk cache entry");
                    self.disk_cache.evict(&disk_key).await;
                }
            }
        }

        let payload = self.fetcher.fetch(request).await?;
        let image = decode_image(payload.bytes.clone(), request.target_size()).await?;

        let write_disk = request.disk_cache_policy().write_enabled()
            && !matches!(request.source(), RequestSource::Bytes(_));
        let disk_cache_key = if write_disk {
            match self.disk_cache.put_bytes(&disk_key, &payload.bytes).await {
                Ok(()) => Some(disk_key.clone()),
                Err(load_error) => {
                    warn!(key = %disk_key, error = %load_error, "Failed to write disk cache");
                    None
                }
            }
        } else {
            None
        };

        let memory_cache_key = self.write_memory(request, &cache_key, &image).await;

        Ok(LoadOutcome {
            image,
            data_source: payload.data_source,
            memory_cache_key,
            disk_cache_key,
        })
    }

    /// Writes the decoded image into the memory cache when the policy
    /// allows, returning the key only for a confirmed write.
    async fn write_memory(
        &self,
        request: &ImageRequest,
        key: &MemoryCacheKey,
        image: &RenderedImage,
    ) -> Option<MemoryCacheKey> {
        if request.memory_cache_policy().write_enabled() {
            self.memory_cache.put(key.clone(), image.clone()).await;
            Some(key.clone())
        } else {
            None
        }
    }
}
