use crate::core::accounts::PropertyStore;
use crate::core::ads::AdsApi;
use crate::core::sheets::SheetsApi;
use crate::core::trigger::{MessageSubscriber, PubSubError, ReceivedMessage, TriggerHandler, TriggerMessage};
use crate::core::upload::AssetFetcher;
use std::sync::Arc;
use std::time::Duration;

/// Pull loop over a Pub/Sub subscription.
///
/// Messages are acknowledged as soon as they are pulled, before they are
/// handled. A failed message is logged and not retried.
pub struct Listener<P, S: ?Sized, A: ?Sized, F: ?Sized, Sub: ?Sized> {
    handler: Arc<TriggerHandler<P, S, A, F>>,
    subscriber: Arc<Sub>,
    poll_interval: Duration,
    max_messages: usize,
}

impl<P, S, A, F, Sub> Listener<P, S, A, F, Sub>
where
    P: PropertyStore,
    S: SheetsApi + ?Sized,
    A: AdsApi + ?Sized,
    F: AssetFetcher + ?Sized,
    Sub: MessageSubscriber + ?Sized,
{
    pub fn new(
        handler: Arc<TriggerHandler<P, S, A, F>>,
        subscriber: Arc<Sub>,
        poll_interval: Duration,
        max_messages: usize,
    ) -> Self {
        Self {
            handler,
            subscriber,
            poll_interval,
            max_messages,
        }
    }

    pub async fn run(&self) {
        tracing::info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            "Listening for trigger messages"
        );
        loop {
            match self.poll_once().await {
                Ok(0) => tokio::time::sleep(self.poll_interval).await,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("Pull failed: {}", e);
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }

    /// Pulls one batch and handles it. Returns the number of messages pulled.
    pub async fn poll_once(&self) -> Result<usize, PubSubError> {
        let messages = self.subscriber.pull(self.max_messages).await?;
        if messages.is_empty() {
            return Ok(0);
        }
        let ack_ids: Vec<String> = messages.iter().map(|m| m.ack_id.clone()).collect();
        self.subscriber.acknowledge(&ack_ids).await?;

        for message in &messages {
            let Some(trigger) = decode(message) else {
                continue;
            };
            // Failures are already logged by the handler.
            let _ = self.handler.handle(&trigger).await;
        }
        Ok(messages.len())
    }
}

fn decode(message: &ReceivedMessage) -> Option<TriggerMessage> {
    let parsed = String::from_utf8(message.data.clone())
        .map_err(|e| e.to_string())
        .and_then(|data| TriggerMessage::parse(&data).map_err(|e| e.to_string()));
    match parsed {
        Ok(trigger) => Some(trigger),
        Err(e) => {
            tracing::warn!(message_id = %message.message_id, "Dropping undecodable message: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::accounts::AccountService;
    use crate::core::ads::testing::FakeAds;
    use crate::core::refresh::RefreshService;
    use crate::core::sheets::testing::{row, FakeSheets};
    use crate::core::sheets::SheetName;
    use crate::core::upload::testing::FakeFetcher;
    use crate::core::upload::UploadService;
    use crate::infra::properties::InMemoryPropertyStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSubscriber {
        queue: Mutex<Vec<ReceivedMessage>>,
        acked: Mutex<Vec<String>>,
    }

    impl FakeSubscriber {
        fn with(messages: Vec<(&str, Vec<u8>)>) -> Self {
            let queue = messages
                .into_iter()
                .map(|(id, data)| ReceivedMessage {
                    ack_id: format!("ack-{}", id),
                    message_id: id.to_string(),
                    data,
                })
                .collect();
            Self {
                queue: Mutex::new(queue),
                acked: Mutex::default(),
            }
        }
    }

    #[async_trait]
    impl MessageSubscriber for FakeSubscriber {
        async fn pull(&self, max_messages: usize) -> Result<Vec<ReceivedMessage>, PubSubError> {
            let mut queue = self.queue.lock().unwrap();
            let take = max_messages.min(queue.len());
            Ok(queue.drain(..take).collect())
        }

        async fn acknowledge(&self, ack_ids: &[String]) -> Result<(), PubSubError> {
            self.acked.lock().unwrap().extend_from_slice(ack_ids);
            Ok(())
        }
    }

    fn handler(
        sheets: Arc<FakeSheets>,
    ) -> Arc<TriggerHandler<InMemoryPropertyStore, FakeSheets, FakeAds, FakeFetcher>> {
        let ads = Arc::new(FakeAds::new());
        let accounts = Arc::new(AccountService::new(InMemoryPropertyStore::new(), sheets.clone()));
        Arc::new(TriggerHandler::new(
            accounts,
            UploadService::new(sheets.clone(), ads.clone(), Arc::new(FakeFetcher::new())),
            RefreshService::new(sheets.clone(), ads, "999", Vec::new()),
            sheets,
        ))
    }

    #[tokio::test]
    async fn test_poll_acks_everything_and_handles_valid_messages() {
        let sheets = Arc::new(FakeSheets::new().with_rows(
            SheetName::NewAssetGroups,
            vec![row(&["", "", "Acme", "Summer", "Shoes"])],
        ));
        let subscriber = Arc::new(FakeSubscriber::with(vec![
            ("1", b"VALIDATE_ASSET_GROUPS".to_vec()),
            ("2", b"NOT_A_MESSAGE".to_vec()),
            ("3", vec![0xff, 0xfe]),
        ]));
        let listener = Listener::new(handler(sheets.clone()), subscriber.clone(), Duration::from_secs(1), 10);

        assert_eq!(listener.poll_once().await.unwrap(), 3);
        assert_eq!(
            *subscriber.acked.lock().unwrap(),
            vec!["ack-1".to_string(), "ack-2".to_string(), "ack-3".to_string()]
        );
        assert_eq!(sheets.cell("NewAssetGroups", 6, 1), "FALSE");

        assert_eq!(listener.poll_once().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_poll_respects_batch_size() {
        let subscriber = Arc::new(FakeSubscriber::with(vec![
            ("1", b"REBUILD_INDEX".to_vec()),
            ("2", b"REBUILD_INDEX".to_vec()),
        ]));
        let listener = Listener::new(handler(Arc::new(FakeSheets::new())), subscriber.clone(), Duration::from_secs(1), 1);

        assert_eq!(listener.poll_once().await.unwrap(), 1);
        assert_eq!(subscriber.queue.lock().unwrap().len(), 1);
    }
}
