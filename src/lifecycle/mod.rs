//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Build server → Bind listener → Serve in background
//!
//! Signals (signals.rs):
//!     SIGINT → Trigger graceful shutdown
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain for up to 5s → Cut the rest → Exit 0
//!
//! State (state.rs):
//!     Created → Serving | Degraded → ShuttingDown → Stopped
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: stop accept, drain, close
//! - Shutdown has a deadline: forced close after the grace period
//! - One broadcast token is the only cancellation channel

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use shutdown::{Shutdown, ShutdownOutcome, GRACE_PERIOD};
pub use state::{RunningServer, ServerState};
