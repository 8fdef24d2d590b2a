use crate::core::upload::{AssetFetcher, FetchError};
use crate::infra::google_auth::GoogleAuth;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

/// Extracts the file id from a Drive sharing link, e.g.
/// `https://drive.google.com/file/d/<id>/view` or `...open?id=<id>`.
pub fn drive_file_id(url: &str) -> Option<String> {
    if !url.contains("drive.google.com") && !url.contains("docs.google.com") {
        return None;
    }
    if let Some(start) = url.find("/d/") {
        let after = &url[start + 3..];
        let end = after.find(&['/', '?', '#'][..]).unwrap_or(after.len());
        let id = &after[..end];
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }
    let query = url.split_once('?')?.1;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("id="))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Downloads images from Google Drive (authenticated) or any public URL.
pub struct DriveAssetFetcher {
    client: Client,
    auth: Arc<GoogleAuth>,
}

impl DriveAssetFetcher {
    pub fn new(auth: Arc<GoogleAuth>) -> Self {
        Self {
            client: Client::new(),
            auth,
        }
    }
}

#[async_trait]
impl AssetFetcher for DriveAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let fail = |reason: String| FetchError {
            url: url.to_string(),
            reason,
        };

        let request = match drive_file_id(url) {
            Some(file_id) => {
                let token = self
                    .auth
                    .access_token()
                    .await
                    .map_err(|e| fail(e.to_string()))?;
                tracing::debug!(file_id = %file_id, "Downloading Drive file");
                self.client
                    .get(format!("{}/{}", DRIVE_FILES_URL, file_id))
                    .query(&[("alt", "media")])
                    .bearer_auth(token)
            }
            None => self.client.get(url),
        };

        let response = request.send().await.map_err(|e| fail(e.to_string()))?;
        if !response.status().is_success() {
            return Err(fail(format!("HTTP {}", response.status())));
        }
        let bytes = response.bytes().await.map_err(|e| fail(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
