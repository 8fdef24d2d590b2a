pub mod pubsub_client;

pub use pubsub_client::PubSubClient;
