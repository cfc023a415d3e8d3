//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the HTTP server from the validated config
//! - Bind the listener and start serving in the background
//! - Block on the interrupt signal, then shut down within the grace period
//!
//! # Design Decisions
//! - Config problems are fatal and surface before any socket is opened
//! - A failed bind is logged and the process stays up without serving until
//!   interrupted, then exits normally
//! - A timed-out shutdown is still a normal shutdown

use std::future::Future;

use crate::config::{ConfigError, ServerConfig};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::{Shutdown, ShutdownOutcome};
use crate::lifecycle::signals;
use crate::lifecycle::state::{RunningServer, ServerState};
use crate::net::Listener;

/// Serve until the process receives an interrupt.
pub async fn run(config: &ServerConfig) -> Result<ShutdownOutcome, ConfigError> {
    let state = RunningServer::new();
    run_until(config, signals::interrupt(), Shutdown::new(), &state).await
}

/// Serve until `signal` resolves.
pub async fn run_until<F>(
    config: &ServerConfig,
    signal: F,
    shutdown: Shutdown,
    state: &RunningServer,
) -> Result<ShutdownOutcome, ConfigError>
where
    F: Future<Output = ()>,
{
    let server = HttpServer::new(config)?;
    let addr = config.bind_address();

    let serving = match Listener::bind(addr).await {
        Ok(listener) => {
            let handle = tokio::spawn(server.run(
                listener,
                shutdown.subscribe(),
                shutdown.grace_period(),
            ));
            advance(state, ServerState::Serving);
            tracing::info!(
                address = %addr,
                root_dir = %config.root_dir().display(),
                upstream = %config.upstream_origin(),
                "Proxy running"
            );
            Some(handle)
        }
        Err(e) => {
            tracing::error!(error = %e, "Listener failed, continuing without serving");
            advance(state, ServerState::Degraded);
            None
        }
    };

    signal.await;
    advance(state, ServerState::ShuttingDown);
    shutdown.trigger();

    let outcome = match serving {
        Some(handle) => match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                // A server task that died is treated as forced termination.
                tracing::error!(error = %e, "Server task failed");
                ShutdownOutcome::TimedOut
            }
        },
        None => ShutdownOutcome::NeverServed,
    };

    tracing::info!(outcome = ?outcome, "Shutting down");
    advance(state, ServerState::Stopped);
    Ok(outcome)
}

fn advance(state: &RunningServer, next: ServerState) {
    if let Err(e) = state.advance(next) {
        tracing::warn!(error = %e, "Unexpected lifecycle transition");
    }
}
