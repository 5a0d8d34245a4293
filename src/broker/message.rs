use serde::{Deserialize, Serialize};

/// Identifier naming a registered delivery destination.
pub type UserId = String;

/// Represents a chat message routed by the broker.
///
/// A message is either unicast to `recipient` or, when `broadcast` is set,
/// fanned out to every registered recipient (in which case `recipient` is
/// ignored). The broker copies messages by value and never mutates them.
///
/// # Fields
///
/// - `sender` - Identifier of the user who sent the message.
/// - `recipient` - Identifier of the addressed user; meaningful only for unicast.
/// - `content` - The opaque message body.
/// - `broadcast` - Selects broadcast routing instead of unicast.
/// - `timestamp` - Send time in milliseconds since the UNIX epoch.
///
/// # Example
///
/// ```rust
/// use chatrelay::Message;
///
/// let msg = Message::direct("alice", "bob", "hi");
/// assert!(!msg.broadcast);
/// assert_eq!(msg.recipient, "bob");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: UserId,
    pub recipient: UserId,
    pub content: String,
    pub broadcast: bool,
    pub timestamp: i64,
}

impl Message {
    pub fn new(
        sender: impl Into<UserId>,
        recipient: impl Into<UserId>,
        content: impl Into<String>,
        broadcast: bool,
        timestamp: i64,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            content: content.into(),
            broadcast,
            timestamp,
        }
    }

    /// A unicast message for `recipient`, stamped with the current time.
    pub fn direct(
        sender: impl Into<UserId>,
        recipient: impl Into<UserId>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(sender, recipient, content, false, now_millis())
    }

    /// A message for every registered recipient, stamped with the current time.
    pub fn broadcast(sender: impl Into<UserId>, content: impl Into<String>) -> Self {
        Self::new(sender, String::new(), content, true, now_millis())
    }
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
