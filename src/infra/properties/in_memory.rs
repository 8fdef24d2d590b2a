// In-memory property store. Nothing survives a restart, so the account index
// is rebuilt from the sheets on first use.

use crate::core::accounts::{PropertyError, PropertyStore};
use async_trait::async_trait;
use dashmap::DashMap;

pub struct InMemoryPropertyStore {
    data: DashMap<String, String>,
}

impl InMemoryPropertyStore {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }
}

impl Default for InMemoryPropertyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PropertyStore for InMemoryPropertyStore {
    async fn get_property(&self, key: &str) -> Result<Option<String>, PropertyError> {
        Ok(self.data.get(key).map(|entry| entry.value().clone()))
    }

    async fn set_property(&self, key: &str, value: String) -> Result<(), PropertyError> {
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete_property(&self, key: &str) -> Result<(), PropertyError> {
        self.data.remove(key);
        Ok(())
    }
}
