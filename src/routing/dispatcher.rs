//! Per-request dispatch between static files and the upstream proxy.
//!
//! # Responsibilities
//! - Decide, from the path alone, whether a request is proxied or served
//!   from disk
//! - Hand the whole request to the chosen handler
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - The decision is a pure function returning [`Route`], so it can be
//!   checked without any I/O
//! - Every method reaches the dispatcher; there is no method filtering here

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::response::Response;

use crate::config::{ConfigError, ServerConfig};
use crate::http::proxy::ProxyForwarder;
use crate::http::static_files::StaticFiles;
use crate::routing::matcher::{Matcher, PathPrefixMatcher};

/// Requests under this prefix go upstream.
pub const API_PREFIX: &str = "/api";

/// Where a request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Forward to the upstream origin with the prefix stripped.
    Proxy,
    /// Serve from the static root.
    Static,
}

/// Routes each request to the static file handler or the proxy forwarder.
#[derive(Clone)]
pub struct Dispatcher {
    api: PathPrefixMatcher,
    files: StaticFiles,
    proxy: Arc<ProxyForwarder>,
}

impl Dispatcher {
    /// Build the dispatcher and its proxy forwarder from the config.
    pub fn new(config: &ServerConfig) -> Result<Self, ConfigError> {
        let api = PathPrefixMatcher::new(API_PREFIX);
        let proxy = ProxyForwarder::new(config, api.clone())?;

        Ok(Self {
            api,
            files: StaticFiles::new(config.root_dir()),
            proxy: Arc::new(proxy),
        })
    }

    /// Decide where `req` goes.
    pub fn route(&self, req: &Request<Body>) -> Route {
        if self.api.matches(req) {
            Route::Proxy
        } else {
            Route::Static
        }
    }

    /// Handle a request end to end.
    pub async fn handle(&self, req: Request<Body>) -> Response {
        let client_ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let route = self.route(&req);
        tracing::debug!(
            method = %req.method(),
            path = %req.uri().path(),
            route = ?route,
            "Dispatching request"
        );

        match route {
            Route::Proxy => self.proxy.forward(req, client_ip).await,
            Route::Static => self.files.serve(req).await,
        }
    }

    pub fn files(&self) -> &StaticFiles {
        &self.files
    }

    pub fn proxy(&self) -> &ProxyForwarder {
        &self.proxy
    }
}
