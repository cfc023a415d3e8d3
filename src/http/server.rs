//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router around the dispatcher
//! - Wire up middleware (tracing, per-request write deadline)
//! - Serve HTTP/1.1 connections accepted from the listener
//! - Drain connections on shutdown within the grace period, then cut the rest
//!
//! # Design Decisions
//! - Connections are driven by hyper directly rather than `axum::serve` so
//!   that the header read timeout can be set and stragglers can be aborted
//! - Each connection is its own task in a `JoinSet`; dropping or shutting
//!   down the set is the forced-termination path
//! - Accept errors are logged and the loop keeps going

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::Response,
    routing::any,
    Router,
};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tower::Service;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ConfigError, ServerConfig};
use crate::lifecycle::shutdown::ShutdownOutcome;
use crate::net::{ConnectionTracker, Listener};
use crate::routing::Dispatcher;

/// Longest time allowed to read a request head.
pub const READ_TIMEOUT: Duration = Duration::from_secs(15);

/// Longest time allowed to produce a response head.
///
/// The deadline ends once the status and headers are ready. A proxied body
/// that is still streaming after that is not cut by it.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(15);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP server for the SPA and its API proxy.
pub struct HttpServer {
    router: Router,
    tracker: ConnectionTracker,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &ServerConfig) -> Result<Self, ConfigError> {
        let dispatcher = Arc::new(Dispatcher::new(config)?);
        let router = Self::build_router(AppState { dispatcher });

        Ok(Self {
            router,
            tracker: ConnectionTracker::new(),
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                WRITE_TIMEOUT,
            ))
            .layer(TraceLayer::new_for_http())
    }

    /// The request router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn connections(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Run the server until `shutdown` fires, then drain for at most
    /// `grace_period`.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
        grace_period: Duration,
    ) -> ShutdownOutcome {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(address = %addr, "HTTP server starting");
        }

        let mut http = http1::Builder::new();
        http.timer(TokioTimer::new())
            .header_read_timeout(READ_TIMEOUT);

        let graceful = GracefulShutdown::new();
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer_addr) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!(error = %e, "Accept failed");
                            continue;
                        }
                    };

                    let guard = self.tracker.track();
                    let router = self.router.clone();
                    let service = service_fn(move |mut req: Request<Incoming>| {
                        req.extensions_mut().insert(ConnectInfo(peer_addr));
                        router.clone().call(req)
                    });

                    let conn = graceful.watch(http.serve_connection(TokioIo::new(stream), service));
                    connections.spawn(async move {
                        if let Err(e) = conn.await {
                            tracing::debug!(
                                connection_id = %guard.id(),
                                peer_addr = %peer_addr,
                                error = %e,
                                "Connection ended with error"
                            );
                        }
                    });
                }

                Some(_) = connections.join_next(), if !connections.is_empty() => {}

                _ = shutdown.recv() => break,
            }
        }

        drop(listener);
        tracing::info!(
            active_connections = self.tracker.active_count(),
            grace_secs = grace_period.as_secs_f64(),
            "Stopped accepting connections, draining"
        );

        let outcome = tokio::select! {
            _ = graceful.shutdown() => ShutdownOutcome::Drained,
            _ = tokio::time::sleep(grace_period) => {
                tracing::warn!(
                    active_connections = self.tracker.active_count(),
                    "Grace period elapsed, closing remaining connections"
                );
                ShutdownOutcome::TimedOut
            }
        };

        connections.shutdown().await;
        tracing::info!(outcome = ?outcome, "HTTP server stopped");
        outcome
    }
}

/// Catch-all handler: everything goes through the dispatcher.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.dispatcher.handle(request).await
}
