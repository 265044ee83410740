//! Byte fetchers for the supported request sources.

mod file;
mod http;

pub use file::FileImageFetcher;
pub use http::HttpImageFetcher;

use bytes::Bytes;

use crate::domain::entities::{DataSource, ImageRequest, RequestSource};
use crate::domain::errors::{LoadError, LoadResult};
use crate::domain::ports::{FetchedPayload, ImageFetcherPort};

/// Routes a request to the fetcher matching its source.
///
/// Inline byte sources are served directly with [`DataSource::Memory`]
/// provenance; there was never a byte source outside the caller.
#[derive(Debug)]
pub struct DefaultImageFetcher {
    http: HttpImageFetcher,
    file: FileImageFetcher,
}

impl DefaultImageFetcher {
    /// Creates a router over an HTTP fetcher with the given timeout and a
    /// local file fetcher.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(timeout: std::time::Duration) -> LoadResult<Self> {
        Ok(Self {
            http: HttpImageFetcher::new(timeout)?,
            file: FileImageFetcher::new(),
        })
    }
}

#[async_trait::async_trait]
impl ImageFetcherPort for DefaultImageFetcher {
    async fn fetch(&self, request: &ImageRequest) -> LoadResult<FetchedPayload> {
        match request.source() {
            RequestSource::Url(_) => self.http.fetch(request).await,
            RequestSource::File(_) => self.file.fetch(request).await,
            RequestSource::Bytes(bytes) => {
                if bytes.is_empty() {
                    return Err(LoadError::EmptyData);
                }
                Ok(FetchedPayload {
                    bytes: Bytes::clone(bytes),
                    data_source: DataSource::Memory,
                })
            }
        }
    }
}
