mod fetcher;
mod storage;

pub use fetcher::{HttpImageFetcher, ImageFetcher};
pub use storage::ImageStorage;

use thiserror::Error;

/// Errors raised while fetching a source image or persisting it to the
/// storage root. Nothing in the pipeline retries; retry policy, if any,
/// belongs to the caller-facing transport.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Invalid source url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to fetch {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Fetch of {url} returned status {status}")]
    BadStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fetch-and-store pipeline: downloads the bytes behind a caller-supplied URL
/// and writes them under the storage root, producing a stable relative
/// reference of the shape `/images/book_<id>_<token>.png`.
pub struct ImageIngestor {
    fetcher: Box<dyn ImageFetcher>,
    storage: ImageStorage,
}

impl ImageIngestor {
    pub fn new(fetcher: Box<dyn ImageFetcher>, storage: ImageStorage) -> Self {
        Self { fetcher, storage }
    }

    pub fn storage(&self) -> &ImageStorage {
        &self.storage
    }

    /// Downloads the source image and persists it for the given book.
    /// Any fetch failure aborts before anything is written to disk.
    pub async fn ingest(&self, source_url: &str, book_id: i64) -> Result<String, IngestionError> {
        let bytes = self.fetcher.fetch(source_url).await?;
        self.storage.save(book_id, &bytes).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;

    /// Fetcher double returning fixed bytes, or a failure for a designated URL.
    pub struct StubFetcher {
        pub bytes: Vec<u8>,
        pub failing_url: Option<String>,
    }

    #[async_trait]
    impl ImageFetcher for StubFetcher {
        async fn fetch(&self, source_url: &str) -> Result<Vec<u8>, IngestionError> {
            if self.failing_url.as_deref() == Some(source_url) {
                return Err(IngestionError::InvalidUrl {
                    url: source_url.to_string(),
                    reason: "unreachable".to_string(),
                });
            }
            Ok(self.bytes.clone())
        }
    }
}
