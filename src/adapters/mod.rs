// Adapters layer: concrete implementations of the domain ports.

pub mod kv_store;
pub mod storage;

pub use kv_store::{FileKeyValueStore, MemoryKeyValueStore};
pub use storage::LocalStorage;
