//! The `store` module keeps a log of chat messages for later retrieval.
//!
//! It is the collaborator the surrounding chat service records messages
//! into, next to the broker that relays them. Records live in memory only
//! and are gone when the process exits.

pub mod memory_store;

pub use memory_store::{MessageStore, StoredMessage};
