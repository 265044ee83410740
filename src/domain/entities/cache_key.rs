//! Cache key for the in-memory image cache.

use super::request::RequestSource;

/// Key identifying a slot in the memory cache.
///
/// Keys are plain strings; [`MemoryCacheKey::from_source`] derives a stable
/// key by hashing the request source, so the same URL or file path always
/// maps to the same slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoryCacheKey(String);

impl MemoryCacheKey {
    /// Creates a new `MemoryCacheKey` from any string-like input.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derives a key from a request source by content hashing.
    #[must_use]
    pub fn from_source(source: &RequestSource) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        match source {
            RequestSource::Url(url) => hasher.update(url.as_bytes()),
            RequestSource::File(path) => hasher.update(path.to_string_lossy().as_bytes()),
            RequestSource::Bytes(bytes) => hasher.update(bytes),
        }
        let digest = hasher.finalize();
        Self(hex::encode(&digest[..16]))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MemoryCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MemoryCacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for MemoryCacheKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_url_source() {
        let source = RequestSource::Url("https://example.com/avatar.png".to_string());
        let key = MemoryCacheKey::from_source(&source);
        assert!(!key.as_str().is_empty());
        assert_eq!(key.as_str().len(), 32);
    }

    #[test]
    fn test_key_consistency() {
        let source = RequestSource::Url("https://example.com/avatar.png".to_string());
        let key1 = MemoryCacheKey::from_source(&source);
        let key2 = MemoryCacheKey::from_source(&source);
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_distinct_sources_distinct_keys() {
        let a = MemoryCacheKey::from_source(&RequestSource::Url("https://a.example".into()));
        let b = MemoryCacheKey::from_source(&RequestSource::Url("https://b.example".into()));
        assert_ne!(a, b);
    }
}
