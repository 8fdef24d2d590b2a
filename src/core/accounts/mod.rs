pub mod account_index;
pub mod account_service;
pub mod property_store;

pub use account_index::{AccountIndex, CreatedEntity};
pub use account_service::{AccountError, AccountService};
pub use property_store::{PropertyError, PropertyStore};
