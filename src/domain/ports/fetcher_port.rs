//! Port definition for byte fetching.

use bytes::Bytes;

use crate::domain::entities::{DataSource, ImageRequest};
use crate::domain::errors::LoadResult;

/// Bytes produced by a fetcher, tagged with their actual provenance.
#[derive(Debug, Clone)]
pub struct FetchedPayload {
    /// The encoded image bytes.
    pub bytes: Bytes,
    /// Where the bytes came from, reported by the collaborator that
    /// supplied them.
    pub data_source: DataSource,
}

/// Port for obtaining encoded image bytes for a request.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ImageFetcherPort: Send + Sync {
    /// Fetches the bytes described by the request's source.
    ///
    /// # Errors
    /// Returns a typed [`LoadError`](crate::domain::errors::LoadError): a
    /// transport failure, an unusable (empty) payload, or a source this
    /// fetcher cannot serve.
    async fn fetch(&self, request: &ImageRequest) -> LoadResult<FetchedPayload>;
}
