//! Request handling and transformation.
//!
//! # Responsibilities
//! - Strip the routing prefix from the path exactly once
//! - Point the URI at the upstream scheme and authority
//! - Set `Origin` to the configured upstream, add X-Forwarded-For
//! - Leave method, query, body and every other header untouched
//!
//! # Design Decisions
//! - The client's `Host` header is forwarded as-is; only the URI changes
//! - Outgoing requests are always HTTP/1.1 regardless of the client version
//! - Original request consumed; the body is streamed, never buffered

use std::net::IpAddr;

use axum::body::Body;
use axum::http::header::ORIGIN;
use axum::http::uri::{Authority, Scheme};
use axum::http::{HeaderValue, Request, Uri, Version};

use crate::http::headers::{append_forwarded_for, strip_hop_by_hop};
use crate::routing::PathPrefixMatcher;

/// Where and how an outgoing request is addressed.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    pub scheme: Scheme,
    pub authority: Authority,
    /// Value of the `Origin` header on every forwarded request.
    pub origin: HeaderValue,
    /// Prefix removed from the incoming path.
    pub prefix: PathPrefixMatcher,
}

impl UpstreamTarget {
    /// Path the upstream sees for an incoming `path`.
    ///
    /// The prefix is removed once. An empty remainder becomes `/`, and a
    /// remainder that is not rooted gets a leading `/`.
    pub fn upstream_path(&self, path: &str) -> String {
        let stripped = self.prefix.strip(path).unwrap_or(path);
        if stripped.starts_with('/') {
            stripped.to_string()
        } else {
            format!("/{stripped}")
        }
    }

    /// Absolute URI for the upstream request, query preserved.
    pub fn upstream_uri(&self, uri: &Uri) -> Result<Uri, axum::http::Error> {
        let path = self.upstream_path(uri.path());
        let path_and_query = match uri.query() {
            Some(query) => format!("{path}?{query}"),
            None => path,
        };

        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }

    /// Rewrite an incoming request into the one sent upstream.
    pub fn prepare(
        &self,
        req: Request<Body>,
        client_ip: Option<IpAddr>,
    ) -> Result<Request<Body>, axum::http::Error> {
        let (mut parts, body) = req.into_parts();

        parts.uri = self.upstream_uri(&parts.uri)?;
        parts.version = Version::HTTP_11;

        strip_hop_by_hop(&mut parts.headers);
        parts.headers.insert(ORIGIN, self.origin.clone());
        if let Some(ip) = client_ip {
            append_forwarded_for(&mut parts.headers, ip);
        }

        Ok(Request::from_parts(parts, body))
    }
}
