// The infra module contains implementations of core traits.
// Each external service gets its own submodule.

#[path = "google_auth/mod.rs"]
pub mod google_auth;

#[path = "sheets/mod.rs"]
pub mod sheets;

#[path = "ads/mod.rs"]
pub mod ads;

#[path = "drive/mod.rs"]
pub mod drive;

#[path = "pubsub/mod.rs"]
pub mod pubsub;

#[path = "properties/mod.rs"]
pub mod properties;
