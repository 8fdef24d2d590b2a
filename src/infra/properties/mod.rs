pub mod in_memory;
pub mod json_store;

pub use in_memory::InMemoryPropertyStore;
pub use json_store::JsonPropertyStore;
