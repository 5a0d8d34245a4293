//! Broker engine
//!
//! This module contains the in-process broker responsible for:
//! - holding the routing table (user id -> delivery channel)
//! - accepting messages from producers through a bounded ingestion queue
//! - running the single dispatch loop that routes each queued message to
//!   one recipient (unicast) or to every registered recipient (broadcast)
//!
//! Delivery is best-effort. A message for an unregistered recipient, or for
//! a recipient whose channel is full or closed, is dropped without an error
//! reaching anyone; producers cannot tell a drop from a delivery.
//!
//! Concurrency and usage notes:
//! - The broker is shared as `Arc<Broker>`; every method takes `&self`.
//! - The routing table sits behind a reader/writer lock. Dispatch holds the
//!   read lock for one routing decision, `register_user`/`unregister_user`
//!   hold the write lock. The lock is never held across an `.await`.
//! - Delivery uses `try_send`, so a slow or dead recipient never stalls the
//!   dispatch loop or the other recipients.
//! - Cancelling the governing token stops the broker for good.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::broker::message::{Message, UserId};
use crate::broker::state::{BrokerState, StateCell};
use crate::client::Client;
use crate::config::BrokerSettings;
use crate::utils::error::BrokerError;

/// In-process chat broker routing messages to registered users.
#[derive(Debug)]
pub struct Broker {
    /// Governing context. Cancelling it stops the broker.
    cancel: CancellationToken,
    /// One-shot "terminated" signal, fired by the dispatch loop on exit.
    done: CancellationToken,
    input: mpsc::Sender<Message>,
    /// Receiving half of the ingestion queue, taken by `run`.
    queue: Mutex<Option<mpsc::Receiver<Message>>>,
    users: RwLock<HashMap<UserId, mpsc::Sender<Message>>>,
    state: StateCell,
    capacity: usize,
}

impl Broker {
    /// Ingestion queue capacity used when none is configured.
    pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

    /// Creates a broker governed by `cancel` with an ingestion queue of
    /// `capacity` messages.
    ///
    /// Nothing runs until [`Broker::run`] is driven. A `capacity` of zero is
    /// raised to one.
    pub fn new(cancel: CancellationToken, capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            warn!("ingestion queue capacity 0 is not allowed, using 1");
            1
        } else {
            capacity
        };
        let (input, queue) = mpsc::channel(capacity);

        Self {
            cancel,
            done: CancellationToken::new(),
            input,
            queue: Mutex::new(Some(queue)),
            users: RwLock::new(HashMap::new()),
            state: StateCell::new(),
            capacity,
        }
    }

    pub fn with_settings(cancel: CancellationToken, settings: &BrokerSettings) -> Self {
        Self::new(cancel, settings.queue_capacity)
    }

    /// Spawns the dispatch loop onto the tokio runtime.
    pub fn spawn(broker: Arc<Broker>) -> JoinHandle<()> {
        tokio::spawn(async move { broker.run().await })
    }

    /// Runs the dispatch loop until the governing token is cancelled.
    ///
    /// Each iteration either observes cancellation, which terminates the
    /// broker, or routes one queued message. Messages still queued at
    /// termination are discarded. Only the first call runs the loop; later
    /// calls return immediately.
    pub async fn run(&self) {
        let Some(queue) = self.queue.lock().take() else {
            warn!("broker dispatch loop already started");
            return;
        };
        self.state.start();
        info!(capacity = self.capacity, "broker dispatch loop started");

        // Terminates the broker when the loop exits or the future is dropped.
        let mut guard = DispatchGuard {
            broker: self,
            queue,
        };

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                Some(msg) = guard.queue.recv() => self.dispatch(msg),
            }
        }
    }

    fn dispatch(&self, msg: Message) {
        let users = self.users.read();

        if msg.broadcast {
            let mut delivered = 0usize;
            for (user, channel) in users.iter() {
                if deliver(user, channel, msg.clone()) {
                    delivered += 1;
                }
            }
            trace!(
                sender = %msg.sender,
                delivered,
                registered = users.len(),
                "broadcast dispatched"
            );
        } else if let Some(channel) = users.get(&msg.recipient) {
            let recipient = msg.recipient.clone();
            deliver(&recipient, channel, msg);
        } else {
            trace!(
                sender = %msg.sender,
                recipient = %msg.recipient,
                "recipient not registered, message dropped"
            );
        }
    }

    /// Hands `msg` to the dispatch loop.
    ///
    /// Waits only while the ingestion queue is full, and resolves as soon as
    /// one of these happens:
    /// - the message is queued: `Ok(())`
    /// - the broker has terminated: `Ok(())`, the message is dropped
    /// - the governing token is cancelled: `Err(BrokerError::Cancelled)`
    ///
    /// `Ok` does not mean the message was delivered.
    pub async fn send_message(&self, msg: Message) -> Result<(), BrokerError> {
        if self.done.is_cancelled() {
            trace!(sender = %msg.sender, "broker terminated, message dropped");
            return Ok(());
        }
        if self.cancel.is_cancelled() {
            return Err(BrokerError::Cancelled);
        }

        tokio::select! {
            biased;
            sent = self.input.send(msg) => {
                if let Err(mpsc::error::SendError(msg)) = sent {
                    trace!(sender = %msg.sender, "ingestion queue closed, message dropped");
                }
                Ok(())
            }
            _ = self.done.cancelled() => Ok(()),
            _ = self.cancel.cancelled() => Err(BrokerError::Cancelled),
        }
    }

    /// Installs `channel` as the delivery channel for `user`, replacing any
    /// earlier registration. A replaced channel is left open; closing it is
    /// up to whoever created it.
    pub fn register_user(&self, user: impl Into<UserId>, channel: mpsc::Sender<Message>) {
        let user = user.into();
        let mut users = self.users.write();
        if users.insert(user.clone(), channel).is_some() {
            debug!(user = %user, "user re-registered, previous channel replaced");
        } else {
            debug!(user = %user, "user registered");
        }
    }

    pub fn register_client(&self, client: Client) {
        self.register_user(client.id, client.sender);
    }

    /// Removes the routing entry for `user`. Unknown users are ignored.
    pub fn unregister_user(&self, user: &str) {
        if self.users.write().remove(user).is_some() {
            debug!(user = %user, "user unregistered");
        }
    }

    pub fn is_registered(&self, user: &str) -> bool {
        self.users.read().contains_key(user)
    }

    pub fn registered_users(&self) -> usize {
        self.users.read().len()
    }

    pub fn state(&self) -> BrokerState {
        if self.done.is_cancelled() {
            BrokerState::Terminated
        } else {
            self.state.load()
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.done.is_cancelled()
    }

    /// Completes once the dispatch loop has exited. Any number of callers
    /// may wait on this; it returns immediately after termination.
    pub async fn terminated(&self) {
        self.done.cancelled().await
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Owns the ingestion queue receiver for the lifetime of the dispatch loop.
struct DispatchGuard<'a> {
    broker: &'a Broker,
    queue: mpsc::Receiver<Message>,
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        // Closing the queue releases producers still waiting on a slot.
        self.queue.close();
        self.broker.done.cancel();
        info!("broker terminated");
    }
}

/// Zero-wait delivery. Full and closed channels are both skipped.
fn deliver(user: &str, channel: &mpsc::Sender<Message>, msg: Message) -> bool {
    match channel.try_send(msg) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            trace!(user = %user, "delivery channel full, message dropped");
            false
        }
        Err(TrySendError::Closed(_)) => {
            trace!(user = %user, "delivery channel closed, message dropped");
            false
        }
    }
}
