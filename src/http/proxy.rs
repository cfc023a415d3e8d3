//! Upstream forwarding.
//!
//! # Data Flow
//! ```text
//! /api/... request
//!     → request.rs (strip prefix, retarget URI, set Origin)
//!     → pooled HTTP client → upstream origin
//!     → response.rs (strip hop-by-hop, add Control-Allow-Origin)
//!     → client
//! ```
//!
//! # Design Decisions
//! - One attempt per request; failures surface as 502, never retried
//! - No proxy-specific timeout: the server-wide deadlines apply
//! - Connection pooling is left to the hyper client
//! - The upstream hop speaks http or https depending on the configured URL;
//!   certificates are checked against the webpki roots

use std::net::IpAddr;

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::response::{IntoResponse, Response};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

use crate::config::validation::upstream_target;
use crate::config::{ConfigError, ServerConfig};
use crate::http::request::UpstreamTarget;
use crate::http::response;
use crate::routing::PathPrefixMatcher;

/// Client used for every upstream request.
pub type HttpClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Failure while forwarding a request upstream.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to build upstream request: {0}")]
    InvalidRequest(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Proxy error");
        response::bad_gateway()
    }
}

/// Forwards prefixed requests to the single configured upstream.
pub struct ProxyForwarder {
    target: UpstreamTarget,
    client: HttpClient,
}

impl ProxyForwarder {
    /// Create a forwarder for the configured upstream.
    pub fn new(config: &ServerConfig, prefix: PathPrefixMatcher) -> Result<Self, ConfigError> {
        let (scheme, authority) = upstream_target(config.upstream_url())?;
        let origin = HeaderValue::from_str(config.upstream_origin()).map_err(|e| {
            ConfigError::InvalidUrl {
                url: config.upstream_origin().to_string(),
                reason: e.to_string(),
            }
        })?;

        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            target: UpstreamTarget {
                scheme,
                authority,
                origin,
                prefix,
            },
            client,
        })
    }

    pub fn target(&self) -> &UpstreamTarget {
        &self.target
    }

    /// Send `req` upstream and relay the answer.
    pub async fn forward(&self, req: Request<Body>, client_ip: Option<IpAddr>) -> Response {
        match self.try_forward(req, client_ip).await {
            Ok(res) => res,
            Err(e) => e.into_response(),
        }
    }

    async fn try_forward(
        &self,
        req: Request<Body>,
        client_ip: Option<IpAddr>,
    ) -> Result<Response, ProxyError> {
        let outgoing = self.target.prepare(req, client_ip)?;

        tracing::debug!(
            method = %outgoing.method(),
            uri = %outgoing.uri(),
            "Forwarding upstream"
        );

        let upstream = self.client.request(outgoing).await?;
        Ok(response::relay(upstream))
    }
}
