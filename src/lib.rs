//! SPA server with an API reverse proxy.
//!
//! Serves a single-page application's static files and forwards every
//! request under `/api` to one upstream origin.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                  spa-proxy                    │
//!                        │                                               │
//!   Client Request       │  ┌─────────┐   ┌─────────┐   ┌────────────┐  │
//!   ─────────────────────┼─▶│   net   │──▶│  http   │──▶│  routing   │  │
//!                        │  │listener │   │ server  │   │ dispatcher │  │
//!                        │  └─────────┘   └─────────┘   └─────┬──────┘  │
//!                        │                          "/api"?   │         │
//!                        │                      ┌─────────────┴──────┐  │
//!                        │                      ▼                    ▼  │
//!                        │              ┌──────────────┐   ┌──────────┐ │
//!                        │              │ static_files │   │  proxy   │─┼──▶ Upstream
//!                        │              │  (root dir)  │   │ forwarder│◀┼─── Origin
//!                        │              └──────────────┘   └──────────┘ │
//!                        │                                               │
//!                        │  config · lifecycle · observability           │
//!                        └──────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
