//! The `client` module defines how a recipient appears to the broker.
//!
//! It provides the `Client` struct, which pairs a recipient identifier with
//! the sending half of the delivery channel that recipient drains.

pub mod chat_client;
pub use chat_client::Client;
