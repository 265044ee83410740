//! Pixfetch - A lightweight async image loading and caching library.
//!
//! This crate loads images through a three-tier pipeline (memory cache,
//! disk cache, fetch + decode) and reports every completed request as an
//! [`ImageResult`]: a closed two-variant outcome carrying provenance and
//! cache bookkeeping.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing cache, fetch, and loader adapters.
pub mod infrastructure;

pub use domain::entities::{
    CachePolicy, DataSource, ErrorResult, ImageRequest, ImageRequestBuilder, ImageResult,
    MemoryCacheKey, RenderedImage, RequestSource, SuccessResult, TargetSize,
};
pub use domain::errors::{LoadError, LoadErrorKind, LoadResult};
pub use domain::ports::{DiskCachePort, FetchedPayload, ImageFetcherPort, MemoryCachePort};
pub use infrastructure::cache::{CacheStats, DiskImageCache, MemoryImageCache};
pub use infrastructure::fetch::{DefaultImageFetcher, FileImageFetcher, HttpImageFetcher};
pub use infrastructure::loader::{ImageLoadedEvent, ImageLoader, ImageLoaderConfig, RequestToken};

/// Current version of the library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = "pixfetch";
