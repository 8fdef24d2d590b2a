use super::asset_fetcher::{AssetFetcher, FetchError};
use async_trait::async_trait;
use std::collections::HashSet;

/// Returns a few fixed bytes for any URL except the ones marked failing.
#[derive(Default)]
pub struct FakeFetcher {
    failing: HashSet<String>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }
}

#[async_trait]
impl AssetFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if self.failing.contains(url) {
            return Err(FetchError {
                url: url.to_string(),
                reason: "HTTP 404 Not Found".to_string(),
            });
        }
        Ok(b"\x89PNG fake image".to_vec())
    }
}
