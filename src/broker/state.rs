//! Broker lifecycle.
//!
//! A broker moves `Created -> Running -> Terminated` exactly once.
//! `Terminated` is absorbing and is read from the broker's terminated
//! signal, so the state and `Broker::is_terminated` never disagree.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerState {
    /// Constructed, dispatch loop not started.
    Created,
    /// Dispatch loop is draining the ingestion queue.
    Running,
    /// The dispatch loop has exited.
    Terminated,
}

/// Records whether the dispatch loop has ever started.
#[derive(Debug)]
pub(crate) struct StateCell(AtomicBool);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// State before termination.
    pub(crate) fn load(&self) -> BrokerState {
        if self.0.load(Ordering::Acquire) {
            BrokerState::Running
        } else {
            BrokerState::Created
        }
    }

    /// `Created -> Running`.
    pub(crate) fn start(&self) {
        self.0.store(true, Ordering::Release);
    }
}
