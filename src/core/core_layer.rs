// The core module contains all business logic.
// Each feature gets its own submodule; nothing in here talks HTTP.

#[path = "config/app_config.rs"]
pub mod config;

#[path = "sheets/mod.rs"]
pub mod sheets;

#[path = "ads/mod.rs"]
pub mod ads;

#[path = "accounts/mod.rs"]
pub mod accounts;

#[path = "validation/mod.rs"]
pub mod validation;

#[path = "edits/mod.rs"]
pub mod edits;

#[path = "upload/mod.rs"]
pub mod upload;

#[path = "refresh/mod.rs"]
pub mod refresh;

#[path = "trigger/mod.rs"]
pub mod trigger;
