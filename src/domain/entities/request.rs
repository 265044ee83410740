//! Immutable description of one image loading request.

use std::path::PathBuf;

use bytes::Bytes;

use super::cache_key::MemoryCacheKey;
use super::rendered_image::RenderedImage;
use crate::domain::errors::LoadError;

/// Where the bytes for a request come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestSource {
    /// Fetch over HTTP(S).
    Url(String),
    /// Read from the local filesystem.
    File(PathBuf),
    /// Already-held encoded bytes, no fetch needed.
    Bytes(Bytes),
}

impl std::fmt::Display for RequestSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Bytes(bytes) => write!(f, "<{} inline bytes>", bytes.len()),
        }
    }
}

impl From<&str> for RequestSource {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

impl From<String> for RequestSource {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

impl From<PathBuf> for RequestSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<Bytes> for RequestSource {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

/// Read/write policy for one cache tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Reads and writes are allowed.
    #[default]
    Enabled,
    /// The tier may be read but never written.
    ReadOnly,
    /// The tier may be written but never read.
    WriteOnly,
    /// The tier is skipped entirely.
    Disabled,
}

impl CachePolicy {
    /// Returns true if the tier may satisfy reads.
    #[must_use]
    pub const fn read_enabled(self) -> bool {
        matches!(self, Self::Enabled | Self::ReadOnly)
    }

    /// Returns true if the tier may accept writes.
    #[must_use]
    pub const fn write_enabled(self) -> bool {
        matches!(self, Self::Enabled | Self::WriteOnly)
    }
}

/// Requested upper bound on delivered pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    /// Maximum width in pixels.
    pub width: u32,
    /// Maximum height in pixels.
    pub height: u32,
}

impl TargetSize {
    /// Creates a new target size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// An immutable description of what to load and how.
///
/// Built once via [`ImageRequest::builder`] and never mutated afterwards;
/// the result model carries the request back to the caller untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    source: RequestSource,
    target_size: Option<TargetSize>,
    memory_cache_policy: CachePolicy,
    disk_cache_policy: CachePolicy,
    placeholder_memory_cache_key: Option<MemoryCacheKey>,
    fallback_image: Option<RenderedImage>,
}

impl ImageRequest {
    /// Creates a request with default policies for the given source.
    #[must_use]
    pub fn new(source: impl Into<RequestSource>) -> Self {
        Self::builder(source).build()
    }

    /// Starts building a request for the given source.
    #[must_use]
    pub fn builder(source: impl Into<RequestSource>) -> ImageRequestBuilder {
        ImageRequestBuilder {
            source: source.into(),
            target_size: None,
            memory_cache_policy: CachePolicy::default(),
            disk_cache_policy: CachePolicy::default(),
            placeholder_memory_cache_key: None,
            fallback_image: None,
        }
    }

    /// The source of the bytes.
    #[must_use]
    pub const fn source(&self) -> &RequestSource {
        &self.source
    }

    /// The requested upper bound on delivered dimensions, if any.
    #[must_use]
    pub const fn target_size(&self) -> Option<TargetSize> {
        self.target_size
    }

    /// Policy for the memory cache tier.
    #[must_use]
    pub const fn memory_cache_policy(&self) -> CachePolicy {
        self.memory_cache_policy
    }

    /// Policy for the disk cache tier.
    #[must_use]
    pub const fn disk_cache_policy(&self) -> CachePolicy {
        self.disk_cache_policy
    }

    /// Memory cache key of the placeholder shown while this request runs.
    #[must_use]
    pub const fn placeholder_memory_cache_key(&self) -> Option<&MemoryCacheKey> {
        self.placeholder_memory_cache_key.as_ref()
    }

    /// Image substituted into an error outcome, if one was configured.
    #[must_use]
    pub const fn fallback_image(&self) -> Option<&RenderedImage> {
        self.fallback_image.as_ref()
    }

    /// Checks that the request is satisfiable.
    ///
    /// # Errors
    /// Returns [`LoadError::InvalidRequest`] for an empty URL or file path.
    pub fn validate(&self) -> Result<(), LoadError> {
        match &self.source {
            RequestSource::Url(url) if url.trim().is_empty() => {
                Err(LoadError::invalid_request("empty url"))
            }
            RequestSource::File(path) if path.as_os_str().is_empty() => {
                Err(LoadError::invalid_request("empty file path"))
            }
            _ => Ok(()),
        }
    }
}

/// Builder for [`ImageRequest`].
#[derive(Debug, Clone)]
pub struct ImageRequestBuilder {
    source: RequestSource,
    target_size: Option<TargetSize>,
    memory_cache_policy: CachePolicy,
    disk_cache_policy: CachePolicy,
    placeholder_memory_cache_key: Option<MemoryCacheKey>,
    fallback_image: Option<RenderedImage>,
}

impl ImageRequestBuilder {
    /// Caps delivered dimensions, enabling downsampled decode.
    #[must_use]
    pub const fn target_size(mut self, width: u32, height: u32) -> Self {
        self.target_size = Some(TargetSize::new(width, height));
        self
    }

    /// Sets the memory cache tier policy.
    #[must_use]
    pub const fn memory_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.memory_cache_policy = policy;
        self
    }

    /// Sets the disk cache tier policy.
    #[must_use]
    pub const fn disk_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.disk_cache_policy = policy;
        self
    }

    /// Names the memory cache slot of the placeholder for this request.
    #[must_use]
    pub fn placeholder_memory_cache_key(mut self, key: MemoryCacheKey) -> Self {
        self.placeholder_memory_cache_key = Some(key);
        self
    }

    /// Supplies an image to substitute into an error outcome.
    #[must_use]
    pub fn fallback_image(mut self, image: RenderedImage) -> Self {
        self.fallback_image = Some(image);
        self
    }

    /// Finalizes the request.
    #[must_use]
    pub fn build(self) -> ImageRequest {
        ImageRequest {
            source: self.source,
            target_size: self.target_size,
            memory_cache_policy: self.memory_cache_policy,
            disk_cache_policy: self.disk_cache_policy,
            placeholder_memory_cache_key: self.placeholder_memory_cache_key,
            fallback_image: self.fallback_image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(CachePolicy::Enabled, true, true ; "enabled")]
    #[test_case(CachePolicy::ReadOnly, true, false ; "read_only")]
    #[test_case(CachePolicy::WriteOnly, false, true ; "write_only")]
    #[test_case(CachePolicy::Disabled, false, false ; "disabled")]
    fn test_cache_policy_predicates(policy: CachePolicy, read: bool, write: bool) {
        assert_eq!(policy.read_enabled(), read);
        assert_eq!(policy.write_enabled(), write);
    }

    #[test]
    fn test_builder_defaults() {
        let request = ImageRequest::new("https://example.com/a.png");
        assert_eq!(request.memory_cache_policy(), CachePolicy::Enabled);
        assert_eq!(request.disk_cache_policy(), CachePolicy::Enabled);
        assert!(request.target_size().is_none());
        assert!(request.placeholder_memory_cache_key().is_none());
        assert!(request.fallback_image().is_none());
    }

    #[test]
    fn test_builder_sets_fields() {
        let key = MemoryCacheKey::new("placeholder");
        let request = ImageRequest::builder("https://example.com/a.png")
            .target_size(320, 240)
            .memory_cache_policy(CachePolicy::ReadOnly)
            .disk_cache_policy(CachePolicy::Disabled)
            .placeholder_memory_cache_key(key.clone())
            .build();
        assert_eq!(request.target_size(), Some(TargetSize::new(320, 240)));
        assert_eq!(request.memory_cache_policy(), CachePolicy::ReadOnly);
        assert_eq!(request.disk_cache_policy(), CachePolicy::Disabled);
        assert_eq!(request.placeholder_memory_cache_key(), Some(&key));
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let request = ImageRequest::new("");
        let error = request.validate().unwrap_err();
        assert_eq!(error.kind(), crate::domain::errors::LoadErrorKind::InvalidRequest);
    }

    #[test]
    fn test_validate_rejects_empty_path() {
        let request = ImageRequest::new(PathBuf::new());
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_inline_bytes() {
        let request = ImageRequest::new(Bytes::from_static(b"\x89PNG"));
        assert!(request.validate().is_ok());
    }
}
