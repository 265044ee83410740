//! HTTP byte fetcher.

use tracing::debug;

use crate::domain::entities::{DataSource, ImageRequest, RequestSource};
use crate::domain::errors::{LoadError, LoadResult};
use crate::domain::ports::{FetchedPayload, ImageFetcherPort};

/// Fetches encoded image bytes over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// Creates a fetcher with its own client and the given request timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(timeout: std::time::Duration) -> LoadResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoadError::network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Creates a fetcher over an existing client.
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn download(&self, url: &str) -> LoadResult<bytes::Bytes> {
        debug!(url = url, "Downloading image");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LoadError::network(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(LoadError::network(format!(
                "HTTP {}: {}",
                response.status(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LoadError::network(format!("failed to read body: {e}")))?;

        if bytes.is_empty() {
            return Err(LoadError::EmptyData);
        }

        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl ImageFetcherPort for HttpImageFetcher {
    async fn fetch(&self, request: &ImageRequest) -> LoadResult<FetchedPayload> {
        let RequestSource::Url(url) = request.source() else {
            return Err(LoadError::invalid_request(
                "HTTP fetcher can only serve URL sources",
            ));
        };

        let bytes = self.download(url).await?;

        Ok(FetchedPayload {
            bytes,
            data_source: DataSource::Network,
        })
    }
}
