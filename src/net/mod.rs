//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind 0.0.0.0:<port>, accept)
//!     → connection.rs (id + live-connection count)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - No TLS: the server speaks plain HTTP/1.1
//! - Each connection tracked so shutdown can report what it is waiting on

pub mod connection;
pub mod listener;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{Listener, ListenerError};
