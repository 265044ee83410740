//! Outcome model for executed image requests.
//!
//! Every completed request produces exactly one [`ImageResult`]. The type is
//! a closed two-variant enum, so consumers branch exhaustively and a future
//! variant addition is a compile error at every match site rather than a
//! silently skipped case.

use super::cache_key::MemoryCacheKey;
use super::rendered_image::RenderedImage;
use super::request::ImageRequest;
use crate::domain::errors::LoadError;

/// Provenance of the bytes behind a successful result.
///
/// Set by whichever collaborator actually supplied the bytes, not by
/// intermediate hops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    /// Served from the in-memory cache.
    MemoryCache,
    /// Served from the disk cache.
    DiskCache,
    /// Downloaded over the network.
    Network,
    /// Read from a local file.
    LocalFile,
    /// Supplied in-process (inline bytes or a synthetic image); there was
    /// never a byte source outside the caller.
    Memory,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemoryCache => write!(f, "memory-cache"),
            Self::DiskCache => write!(f, "disk-cache"),
            Self::Network => write!(f, "network"),
            Self::LocalFile => write!(f, "file"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// The outcome of an executed [`ImageRequest`].
///
/// Constructed exactly once by the pipeline when a request finishes, then
/// owned by the caller. Immutable: a changed outcome requires a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageResult {
    /// The request completed and produced a usable image.
    Success(SuccessResult),
    /// The request did not complete.
    Error(ErrorResult),
}

impl ImageResult {
    /// Returns the rendered image without narrowing to a variant.
    ///
    /// Always present for a success; present for an error only if a
    /// fallback image was substituted.
    #[must_use]
    pub fn image(&self) -> Option<&RenderedImage> {
        match self {
            Self::Success(success) => Some(&success.image),
            Self::Error(error) => error.image.as_ref(),
        }
    }

    /// Returns the request that produced this outcome.
    #[must_use]
    pub fn request(&self) -> &ImageRequest {
        match self {
            Self::Success(success) => &success.request,
            Self::Error(error) => &error.request,
        }
    }

    /// Returns true for the success variant.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns true for the error variant.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Narrows to the success variant.
    #[must_use]
    pub const fn as_success(&self) -> Option<&SuccessResult> {
        match self {
            Self::Success(success) => Some(success),
            Self::Error(_) => None,
        }
    }

    /// Narrows to the error variant.
    #[must_use]
    pub const fn as_error(&self) -> Option<&ErrorResult> {
        match self {
            Self::Success(_) => None,
            Self::Error(error) => Some(error),
        }
    }
}

impl From<SuccessResult> for ImageResult {
    fn from(success: SuccessResult) -> Self {
        Self::Success(success)
    }
}

impl From<ErrorResult> for ImageResult {
    fn from(error: ErrorResult) -> Self {
        Self::Error(error)
    }
}

/// A request that completed successfully.
///
/// Cache key fields are `Some` only when the pipeline wrote (or confirmed
/// residency of) this exact image in the corresponding cache under that key
/// at the moment the result was produced; they are never speculative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessResult {
    image: RenderedImage,
    request: ImageRequest,
    data_source: DataSource,
    memory_cache_key: Option<MemoryCacheKey>,
    disk_cache_key: Option<String>,
    is_sampled: bool,
    is_placeholder_cached: bool,
}

impl SuccessResult {
    /// Creates a success outcome. Cache keys default to absent and the
    /// derived flags to false; the pipeline sets them via the `with_`
    /// methods as it confirms each fact.
    #[must_use]
    pub fn new(image: RenderedImage, request: ImageRequest, data_source: DataSource) -> Self {
        Self {
            image,
            request,
            data_source,
            memory_cache_key: None,
            disk_cache_key: None,
            is_sampled: false,
            is_placeholder_cached: false,
        }
    }

    /// Records a confirmed memory cache write or hit under `key`.
    #[must_use]
    pub fn with_memory_cache_key(mut self, key: MemoryCacheKey) -> Self {
        self.memory_cache_key = Some(key);
        self
    }

    /// Records a confirmed disk cache write or hit under `key`.
    #[must_use]
    pub fn with_disk_cache_key(mut self, key: impl Into<String>) -> Self {
        self.disk_cache_key = Some(key.into());
        self
    }

    /// Records whether a downsampled decode occurred.
    #[must_use]
    pub const fn with_sampled(mut self, is_sampled: bool) -> Self {
        self.is_sampled = is_sampled;
        self
    }

    /// Records whether the request's placeholder was resident in the memory
    /// cache at dispatch time.
    #[must_use]
    pub const fn with_placeholder_cached(mut self, is_placeholder_cached: bool) -> Self {
        self.is_placeholder_cached = is_placeholder_cached;
        self
    }

    /// The final image to display.
    #[must_use]
    pub const fn image(&self) -> &RenderedImage {
        &self.image
    }

    /// The request that was executed to create this result.
    #[must_use]
    pub const fn request(&self) -> &ImageRequest {
        &self.request
    }

    /// Where the bytes ultimately came from.
    #[must_use]
    pub const fn data_source(&self) -> DataSource {
        self.data_source
    }

    /// Memory cache slot holding this image, if it was written there.
    #[must_use]
    pub const fn memory_cache_key(&self) -> Option<&MemoryCacheKey> {
        self.memory_cache_key.as_ref()
    }

    /// Disk cache key for this image, if it was written there.
    #[must_use]
    pub fn disk_cache_key(&self) -> Option<&str> {
        self.disk_cache_key.as_deref()
    }

    /// True if the image was decoded below its native dimensions.
    #[must_use]
    pub const fn is_sampled(&self) -> bool {
        self.is_sampled
    }

    /// True if the request's placeholder was found in the memory cache at
    /// dispatch time, independent of the final image's cache status.
    #[must_use]
    pub const fn is_placeholder_cached(&self) -> bool {
        self.is_placeholder_cached
    }
}

/// A request that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResult {
    image: Option<RenderedImage>,
    request: ImageRequest,
    error: LoadError,
}

impl ErrorResult {
    /// Creates an error outcome. `image` is the explicitly configured
    /// fallback, if any; no image is ever invented here.
    #[must_use]
    pub const fn new(
        image: Option<RenderedImage>,
        request: ImageRequest,
        error: LoadError,
    ) -> Self {
        Self {
            image,
            request,
            error,
        }
    }

    /// The substituted fallback image, if one was configured.
    #[must_use]
    pub const fn image(&self) -> Option<&RenderedImage> {
        self.image.as_ref()
    }

    /// The request that was executed to create this result.
    #[must_use]
    pub const fn request(&self) -> &ImageRequest {
        &self.request
    }

    /// Why the request did not complete.
    #[must_use]
    pub const fn error(&self) -> &LoadError {
        &self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::LoadErrorKind;
    use test_case::test_case;

    fn test_image() -> RenderedImage {
        RenderedImage::new(image::DynamicImage::new_rgb8(10, 10))
    }

    fn test_request() -> ImageRequest {
        ImageRequest::new("https://example.com/a.png")
    }

    #[test]
    fn test_success_from_memory_cache() {
        let key = MemoryCacheKey::new("slot-a");
        let result = ImageResult::from(
            SuccessResult::new(test_image(), test_request(), DataSource::MemoryCache)
                .with_memory_cache_key(key.clone())
                .with_placeholder_cached(true),
        );

        let success = result.as_success().unwrap();
        assert_eq!(success.data_source(), DataSource::MemoryCache);
        assert_eq!(success.memory_cache_key(), Some(&key));
        assert_eq!(success.disk_cache_key(), None);
        assert!(!success.is_sampled());
        assert!(success.is_placeholder_cached());
    }

    #[test]
    fn test_error_without_fallback() {
        let request = test_request();
        let result = ImageResult::from(ErrorResult::new(
            None,
            request.clone(),
            LoadError::decode("truncated stream"),
        ));

        assert!(result.is_error());
        assert!(result.image().is_none());
        let error = result.as_error().unwrap();
        assert!(error.image().is_none());
        assert_eq!(error.error().kind(), LoadErrorKind::Decode);
        assert_eq!(error.request(), &request);
    }

    #[test]
    fn test_shared_accessors_without_narrowing() {
        let request = test_request();
        let success: ImageResult =
            SuccessResult::new(test_image(), request.clone(), DataSource::Network).into();
        let failure: ImageResult =
            ErrorResult::new(Some(test_image()), request.clone(), LoadError::EmptyData).into();

        for result in [&success, &failure] {
            assert_eq!(result.request(), &request);
            assert!(result.image().is_some());
        }
    }

    #[test]
    fn test_request_round_trip() {
        let request = ImageRequest::builder("https://example.com/b.png")
            .target_size(100, 100)
            .build();
        let result: ImageResult =
            SuccessResult::new(test_image(), request.clone(), DataSource::DiskCache).into();
        assert_eq!(result.request(), &request);
    }

    #[test]
    fn test_omitted_keys_stay_absent() {
        let success = SuccessResult::new(test_image(), test_request(), DataSource::Network);
        assert_eq!(success.memory_cache_key(), None);
        assert_eq!(success.disk_cache_key(), None);
    }

    #[test]
    fn test_structural_equality() {
        let make = |sampled| {
            SuccessResult::new(test_image(), test_request(), DataSource::Network)
                .with_disk_cache_key("abc")
                .with_sampled(sampled)
        };
        assert_eq!(make(false), make(false));
        assert_ne!(make(false), make(true));
    }

    #[test]
    fn test_exhaustive_match_covers_both_variants() {
        let result: ImageResult =
            SuccessResult::new(test_image(), test_request(), DataSource::Memory).into();
        // A wildcard-free match: adding a third variant breaks this arm list.
        let tag = match result {
            ImageResult::Success(_) => "success",
            ImageResult::Error(_) => "error",
        };
        assert_eq!(tag, "success");
    }

    #[test_case(DataSource::MemoryCache, "memory-cache")]
    #[test_case(DataSource::DiskCache, "disk-cache")]
    #[test_case(DataSource::Network, "network")]
    #[test_case(DataSource::LocalFile, "file")]
    #[test_case(DataSource::Memory, "memory")]
    fn test_data_source_display(source: DataSource, expected: &str) {
        assert_eq!(source.to_string(), expected);
    }
}
