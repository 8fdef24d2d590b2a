use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key/value properties scoped to one spreadsheet document.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    async fn get_property(&self, key: &str) -> Result<Option<String>, PropertyError>;
    async fn set_property(&self, key: &str, value: String) -> Result<(), PropertyError>;
    async fn delete_property(&self, key: &str) -> Result<(), PropertyError>;
}
