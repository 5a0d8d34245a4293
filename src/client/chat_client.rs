use tokio::sync::mpsc;
use uuid::Uuid;

use crate::broker::message::{Message, UserId};

/// A recipient known to the broker.
///
/// The recipient owns the delivery channel: it keeps the receiver and is
/// solely responsible for draining it. The broker only ever holds a clone
/// of `sender` and never closes or resizes the channel.
#[derive(Debug, Clone)]
pub struct Client {
    /// Routing key for unicast delivery.
    pub id: UserId,

    /// Sending half of the recipient's delivery channel.
    pub sender: mpsc::Sender<Message>,
}

impl Client {
    /// Create a client with a fresh UUID identifier.
    pub fn new(sender: mpsc::Sender<Message>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), sender)
    }

    pub fn with_id(id: impl Into<UserId>, sender: mpsc::Sender<Message>) -> Self {
        Self {
            id: id.into(),
            sender,
        }
    }

    /// Create a delivery channel holding up to `capacity` messages and a
    /// client for `id` that sends into it. The returned receiver is the
    /// recipient's inbox.
    pub fn channel(id: impl Into<UserId>, capacity: usize) -> (Self, mpsc::Receiver<Message>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::with_id(id, sender), receiver)
    }
}
