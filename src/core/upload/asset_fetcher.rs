use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Failed to download {url}: {reason}")]
pub struct FetchError {
    pub url: String,
    pub reason: String,
}

/// Downloads image content referenced from the sheet.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
