use super::IngestionError;
use async_trait::async_trait;
use std::time::Duration;

/// Source of image bytes. The production implementation goes over HTTP;
/// tests substitute a stub.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetches the full body behind the URL.
    /// Any failure (malformed URL, unreachable host, timeout, non-2xx)
    /// surfaces as an [`IngestionError`] with no partial result.
    async fn fetch(&self, source_url: &str) -> Result<Vec<u8>, IngestionError>;
}

pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// # Arguments
    /// * `timeout_sec` - Per-request timeout; a hung remote would otherwise
    ///   block the handling task indefinitely.
    pub fn new(timeout_sec: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, source_url: &str) -> Result<Vec<u8>, IngestionError> {
        let url = reqwest::Url::parse(source_url).map_err(|e| IngestionError::InvalidUrl {
            url: source_url.to_string(),
            reason: e.to_string(),
        })?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| IngestionError::Fetch {
                url: source_url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(IngestionError::BadStatus {
                url: source_url.to_string(),
                status: response.status(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| IngestionError::Fetch {
                url: source_url.to_string(),
                source,
            })?;

        Ok(bytes.to_vec())
    }
}
