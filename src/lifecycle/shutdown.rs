//! Shutdown coordination.

use std::time::Duration;

use tokio::sync::broadcast;

/// Time in-flight requests get to finish once shutdown starts.
pub const GRACE_PERIOD: Duration = Duration::from_secs(5);

/// How the server stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every connection closed within the grace period.
    Drained,
    /// The grace period ran out and remaining connections were cut.
    TimedOut,
    /// The listener never bound, so there was nothing to drain.
    NeverServed,
}

/// Coordinator for graceful shutdown.
///
/// A single broadcast token: the accept loop subscribes, the lifecycle
/// triggers it once on interrupt.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    grace_period: Duration,
}

impl Shutdown {
    /// Create a coordinator with the default grace period.
    pub fn new() -> Self {
        Self::with_grace_period(GRACE_PERIOD)
    }

    pub fn with_grace_period(grace_period: Duration) -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx, grace_period }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Number of tasks still listening for the signal.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
