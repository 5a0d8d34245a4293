//! # ChatRelay
//!
//! `chatrelay` is an in-process chat message broker built on tokio. Producers
//! hand messages to the broker without waiting on consumers, and a single
//! dispatch loop routes each message to one addressed recipient or to every
//! registered recipient.
//!
//! ## Core Modules
//!
//! - `broker`: The routing table, the bounded ingestion queue and the dispatch loop.
//! - `client`: A registered recipient identity paired with its delivery channel.
//! - `config`: Loads broker, store and logging settings from files and the environment.
//! - `store`: An in-memory message log the surrounding chat service records into.
//! - `utils`: Error types and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod store;
pub mod utils;

pub use broker::{Broker, BrokerState, Message, UserId};
pub use client::Client;
pub use store::{MessageStore, StoredMessage};
pub use utils::error::{BrokerError, StoreError};
