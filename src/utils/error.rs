//! The `error` module defines the error types surfaced by `chatrelay`.
//!
//! Routing failures are not errors: a message for an absent recipient, or
//! for a recipient whose channel is full or closed, is dropped silently.
//! The only broker error is cancellation of its governing token.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    /// The broker's governing cancellation token was cancelled before the
    /// message could be queued.
    #[error("broker context cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("message {0} not found")]
    NotFound(u64),

    #[error("invalid message: {0}")]
    InvalidMessage(&'static str),
}
