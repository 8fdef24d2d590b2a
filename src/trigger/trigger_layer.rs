// Trigger layer - command line and the Pub/Sub listener.

#[path = "cli.rs"]
pub mod cli;

#[path = "listener.rs"]
pub mod listener;

pub use cli::{Cli, Command};
pub use listener::Listener;
