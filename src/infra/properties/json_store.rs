use crate::core::accounts::{PropertyError, PropertyStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Document properties kept in one JSON file per spreadsheet.
pub struct JsonPropertyStore {
    path: PathBuf,
    cache: RwLock<BTreeMap<String, String>>,
}

impl JsonPropertyStore {
    /// Opens (or starts) the property file for a spreadsheet under `dir`.
    pub fn open(dir: impl AsRef<Path>, spreadsheet_id: &str) -> Result<Self, PropertyError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.properties.json", spreadsheet_id));

        let map = if path.exists() {
            let file = std::fs::File::open(&path)?;
            serde_json::from_reader(file).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable property file {}: {}", path.display(), e);
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            cache: RwLock::new(map),
        })
    }

    async fn persist(&self) -> Result<(), PropertyError> {
        let bytes = {
            let cache = self.cache.read().await;
            serde_json::to_vec_pretty(&*cache)?
        };
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl PropertyStore for JsonPropertyStore {
    async fn get_property(&self, key: &str) -> Result<Option<String>, PropertyError> {
        let cache = self.cache.read().await;
        Ok(cache.get(key).cloned())
    }

    async fn set_property(&self, key: &str, value: String) -> Result<(), PropertyError> {
        let mut cache = self.cache.write().await;
        cache.insert(key.to_string(), value);
        drop(cache); // Release lock before persisting
        self.persist().await
    }

    async fn delete_property(&self, key: &str) -> Result<(), PropertyError> {
        let mut cache = self.cache.write().await;
        let existed = cache.remove(key).is_some();
        drop(cache);
        if !existed {
            return Ok(());
        }
        self.persist().await
    }
}
