use std::collections::VecDeque;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::broker::message::{Message, now_millis};
use crate::config::StoreSettings;
use crate::utils::error::StoreError;

/// A message as recorded in the store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    /// Assigned by the store, starting at 1. Never reused.
    pub id: u64,
    pub sender: String,
    pub content: String,
    pub timestamp: i64,
}

#[derive(Debug)]
struct Log {
    // ascending id order
    records: VecDeque<StoredMessage>,
    next_id: u64,
}

/// In-memory message log behind a reader/writer lock.
///
/// Reads return copies, never a live view of the log.
#[derive(Debug)]
pub struct MessageStore {
    log: RwLock<Log>,
    max_messages: Option<usize>,
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MessageStore {
    /// Create a store. With `max_messages` set, appending to a full log
    /// evicts the oldest record first.
    pub fn new(max_messages: Option<usize>) -> Self {
        Self {
            log: RwLock::new(Log {
                records: VecDeque::new(),
                next_id: 1,
            }),
            max_messages,
        }
    }

    pub fn with_settings(settings: &StoreSettings) -> Self {
        Self::new(settings.max_messages)
    }

    /// Record `msg`, keeping its sender, content and timestamp.
    pub fn append(&self, msg: &Message) -> Result<StoredMessage, StoreError> {
        self.insert(&msg.sender, &msg.content, msg.timestamp)
    }

    /// Record a new message from `sender` stamped with the current time.
    pub fn create(&self, sender: &str, content: &str) -> Result<StoredMessage, StoreError> {
        self.insert(sender, content, now_millis())
    }

    fn insert(
        &self,
        sender: &str,
        content: &str,
        timestamp: i64,
    ) -> Result<StoredMessage, StoreError> {
        if sender.is_empty() {
            return Err(StoreError::InvalidMessage("sender is required"));
        }
        validate_content(content)?;

        let mut log = self.log.write();
        let record = StoredMessage {
            id: log.next_id,
            sender: sender.to_string(),
            content: content.to_string(),
            timestamp,
        };
        log.next_id += 1;

        if let Some(max) = self.max_messages {
            while log.records.len() >= max.max(1) {
                if let Some(evicted) = log.records.pop_front() {
                    debug!(id = evicted.id, "store full, evicted oldest message");
                }
            }
        }
        log.records.push_back(record.clone());

        Ok(record)
    }

    /// Snapshot of the log in insertion order. `Some(sender)` keeps only
    /// that sender's messages; an empty filter is the same as `None`.
    pub fn list(&self, sender: Option<&str>) -> Vec<StoredMessage> {
        let log = self.log.read();
        match sender {
            Some(sender) if !sender.is_empty() => log
                .records
                .iter()
                .filter(|m| m.sender == sender)
                .cloned()
                .collect(),
            _ => log.records.iter().cloned().collect(),
        }
    }

    pub fn get(&self, id: u64) -> Result<StoredMessage, StoreError> {
        let log = self.log.read();
        log.position(id)
            .map(|idx| log.records[idx].clone())
            .ok_or(StoreError::NotFound(id))
    }

    /// Replace the content of message `id`.
    pub fn update(&self, id: u64, content: &str) -> Result<StoredMessage, StoreError> {
        validate_content(content)?;

        let mut log = self.log.write();
        let idx = log.position(id).ok_or(StoreError::NotFound(id))?;
        let record = &mut log.records[idx];
        record.content = content.to_string();
        Ok(record.clone())
    }

    pub fn delete(&self, id: u64) -> Result<(), StoreError> {
        let mut log = self.log.write();
        let idx = log.position(id).ok_or(StoreError::NotFound(id))?;
        log.records.remove(idx);
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.log.read().records.len()
    }
}

impl Log {
    fn position(&self, id: u64) -> Option<usize> {
        self.records.binary_search_by_key(&id, |m| m.id).ok()
    }
}

fn validate_content(content: &str) -> Result<(), StoreError> {
    if content.is_empty() {
        return Err(StoreError::InvalidMessage("content is required"));
    }
    Ok(())
}
