use crate::core::trigger::{MessagePublisher, MessageSubscriber, PubSubError, ReceivedMessage};
use crate::infra::google_auth::GoogleAuth;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

const PUBSUB_API_BASE: &str = "https://pubsub.googleapis.com/v1";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PublishResponse {
    message_ids: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PulledMessage {
    data: String,
    message_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ReceivedEntry {
    ack_id: String,
    message: PulledMessage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PullResponse {
    received_messages: Vec<ReceivedEntry>,
}

/// Converts a pull response; entries with undecodable data keep empty bytes
/// so they are still acknowledged.
fn received_messages(response: PullResponse) -> Vec<ReceivedMessage> {
    response
        .received_messages
        .into_iter()
        .map(|entry| {
            let data = STANDARD.decode(entry.message.data.as_bytes()).unwrap_or_else(|e| {
                tracing::warn!(message_id = %entry.message.message_id, "Undecodable message data: {}", e);
                Vec::new()
            });
            ReceivedMessage {
                ack_id: entry.ack_id,
                message_id: entry.message.message_id,
                data,
            }
        })
        .collect()
}

/// Pub/Sub v1 REST client for one project.
pub struct PubSubClient {
    client: Client,
    auth: Arc<GoogleAuth>,
    project_id: String,
    topic: Option<String>,
    subscription: Option<String>,
}

impl PubSubClient {
    pub fn new(
        auth: Arc<GoogleAuth>,
        project_id: impl Into<String>,
        topic: Option<String>,
        subscription: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            auth,
            project_id: project_id.into(),
            topic,
            subscription,
        }
    }

    fn subscription_url(&self, verb: &str) -> Result<String, PubSubError> {
        let subscription = self
            .subscription
            .as_deref()
            .ok_or(PubSubError::NotConfigured("PUBSUB_SUBSCRIPTION"))?;
        Ok(format!(
            "{}/projects/{}/subscriptions/{}:{}",
            PUBSUB_API_BASE, self.project_id, subscription, verb
        ))
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, PubSubError> {
        let token = self
            .auth
            .access_token()
            .await
            .map_err(|e| PubSubError::Api(e.to_string()))?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| PubSubError::Api(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PubSubError::Api(format!("{}: {}", status, body)));
        }
        response
            .json()
            .await
            .map_err(|e| PubSubError::Api(e.to_string()))
    }
}

#[async_trait]
impl MessagePublisher for PubSubClient {
    async fn publish(&self, data: &str) -> Result<String, PubSubError> {
        let topic = self
            .topic
            .as_deref()
            .ok_or(PubSubError::NotConfigured("PUBSUB_TOPIC"))?;
        let url = format!(
            "{}/projects/{}/topics/{}:publish",
            PUBSUB_API_BASE, self.project_id, topic
        );
        let body = json!({ "messages": [{ "data": STANDARD.encode(data.as_bytes()) }] });
        let response: PublishResponse = self.post(&url, &body).await?;
        response
            .message_ids
            .into_iter()
            .next()
            .ok_or_else(|| PubSubError::Api("Publish returned no message id".to_string()))
    }
}

#[async_trait]
impl MessageSubscriber for PubSubClient {
    async fn pull(&self, max_messages: usize) -> Result<Vec<ReceivedMessage>, PubSubError> {
        let url = self.subscription_url("pull")?;
        let body = json!({ "maxMessages": max_messages });
        let response: PullResponse = self.post(&url, &body).await?;
        Ok(received_messages(response))
    }

    async fn acknowledge(&self, ack_ids: &[String]) -> Result<(), PubSubError> {
        if ack_ids.is_empty() {
            return Ok(());
        }
        let url = self.subscription_url("acknowledge")?;
        let _: serde_json::Value = self.post(&url, &json!({ "ackIds": ack_ids })).await?;
        Ok(())
    }
}
