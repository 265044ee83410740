//! Local file byte fetcher.

use tracing::debug;

use crate::domain::entities::{DataSource, ImageRequest, RequestSource};
use crate::domain::errors::{LoadError, LoadResult};
use crate::domain::ports::{FetchedPayload, ImageFetcherPort};

/// Reads encoded image bytes from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileImageFetcher;

impl FileImageFetcher {
    /// Creates a file fetcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ImageFetcherPort for FileImageFetcher {
    async fn fetch(&self, request: &ImageRequest) -> LoadResult<FetchedPayload> {
        let RequestSource::File(path) = request.source() else {
            return Err(LoadError::invalid_request(
                "file fetcher can only serve file sources",
            ));
        };

        debug!(path = %path.display(), "Reading image file");

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| LoadError::io(format!("failed to read {}: {e}", path.display())))?;

        if bytes.is_empty() {
            return Err(LoadError::EmptyData);
        }

        Ok(FetchedPayload {
            bytes: bytes.into(),
            data_source: DataSource::LocalFile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::LoadErrorKind;

    #[tokio::test]
    async fn test_reads_file_with_local_provenance() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pixel.dat");
        tokio::fs::write(&path, b"encoded").await.unwrap();

        let fetcher = FileImageFetcher::new();
        let payload = fetcher.fetch(&ImageRequest::new(path)).await.unwrap();

        assert_eq!(payload.data_source, DataSource::LocalFile);
        assert_eq!(&payload.bytes[..], b"encoded");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let fetcher = FileImageFetcher::new();
        let request = ImageRequest::new(std::path::PathBuf::from("/nonexistent/pixel.png"));

        let error = fetcher.fetch(&request).await.unwrap_err();
        assert_eq!(error.kind(), LoadErrorKind::Io);
    }

    #[tokio::test]
    async fn test_empty_file_is_empty_data() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("empty.dat");
        tokio::fs::write(&path, b"").await.unwrap();

        let fetcher = FileImageFetcher::new();
        let error = fetcher.fetch(&ImageRequest::new(path)).await.unwrap_err();
        assert_eq!(error.kind(), LoadErrorKind::EmptyData);
    }
}
