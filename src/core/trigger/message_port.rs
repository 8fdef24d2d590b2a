use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PubSubError {
    #[error("Pub/Sub API error: {0}")]
    Api(String),

    #[error("Pub/Sub is not configured: {0}")]
    NotConfigured(&'static str),
}

/// A pulled message. `data` is already base64-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub ack_id: String,
    pub message_id: String,
    pub data: Vec<u8>,
}

#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publishes one message and returns its server-assigned id.
    async fn publish(&self, data: &str) -> Result<String, PubSubError>;
}

#[async_trait]
pub trait MessageSubscriber: Send + Sync {
    async fn pull(&self, max_messages: usize) -> Result<Vec<ReceivedMessage>, PubSubError>;

    async fn acknowledge(&self, ack_ids: &[String]) -> Result<(), PubSubError>;
}
