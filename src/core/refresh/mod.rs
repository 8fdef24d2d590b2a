pub mod refresh_rows;
pub mod refresh_service;

pub use refresh_service::{RefreshError, RefreshScope, RefreshService};
