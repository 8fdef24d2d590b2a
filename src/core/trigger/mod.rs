pub mod message_port;
pub mod trigger_handler;
pub mod trigger_message;

pub use message_port::{MessagePublisher, MessageSubscriber, PubSubError, ReceivedMessage};
pub use trigger_handler::{HandlerError, HandlerOutcome, TriggerHandler};
pub use trigger_message::{decode_data, decode_push, TriggerError, TriggerMessage};
