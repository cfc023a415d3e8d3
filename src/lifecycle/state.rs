//! Server state machine.
//!
//! ```text
//! Created ──bind ok──▶ Serving ──interrupt──▶ ShuttingDown ──drained/grace──▶ Stopped
//!    │                                            ▲
//!    └──bind failed──▶ Degraded ──interrupt───────┘
//! ```
//!
//! Transitions are linear; nothing re-enters an earlier state.

use thiserror::Error;
use tokio::sync::watch;

/// Lifecycle state of the running server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Created,
    Serving,
    /// The listener failed to bind; the process waits for interrupt without
    /// serving anything.
    Degraded,
    ShuttingDown,
    Stopped,
}

impl ServerState {
    fn can_advance_to(self, next: ServerState) -> bool {
        use ServerState::*;
        matches!(
            (self, next),
            (Created, Serving)
                | (Created, Degraded)
                | (Serving, ShuttingDown)
                | (Degraded, ShuttingDown)
                | (ShuttingDown, Stopped)
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid server state transition {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: ServerState,
    pub to: ServerState,
}

/// Observable handle on the server's lifecycle state.
#[derive(Debug)]
pub struct RunningServer {
    state: watch::Sender<ServerState>,
}

impl RunningServer {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ServerState::Created);
        Self { state }
    }

    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    /// Move to `next` if the transition is allowed.
    pub fn advance(&self, next: ServerState) -> Result<(), InvalidTransition> {
        let mut result = Ok(());
        self.state.send_if_modified(|current| {
            if current.can_advance_to(next) {
                tracing::debug!(from = ?*current, to = ?next, "Server state changed");
                *current = next;
                true
            } else {
                result = Err(InvalidTransition {
                    from: *current,
                    to: next,
                });
                false
            }
        });
        result
    }
}

impl Default for RunningServer {
    fn default() -> Self {
        Self::new()
    }
}
