//! Observability subsystem.
//!
//! All subsystems emit `tracing` events with structured fields; `logging.rs`
//! decides where they go. Per-request spans come from `TraceLayer` in the
//! HTTP server.

pub mod logging;
