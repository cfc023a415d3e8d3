//! Configuration validation.
//!
//! # Responsibilities
//! - Presence checks (`DIR`, `PORT`, `URL` must be set and non-empty)
//! - Validate value ranges (port in 1..=65535)
//! - Validate the upstream URL shape (scheme + host)
//!
//! # Design Decisions
//! - Pure functions: &str → Result<T, ConfigError>
//! - Runs before config is accepted into the system
//! - Upstream target conversion lives here so the proxy never sees a URL
//!   that was not checked at startup

use std::str::FromStr;

use axum::http::uri::{Authority, Scheme};
use url::{Position, Url};

use crate::config::loader::ConfigError;

/// Require a non-empty static root.
pub fn require_dir(dir: Option<&str>) -> Result<&str, ConfigError> {
    match dir.map(str::trim) {
        Some(d) if !d.is_empty() => Ok(d),
        _ => Err(ConfigError::MissingDir),
    }
}

/// Parse the listen port; zero is treated the same as unset.
pub fn parse_port(port: Option<&str>) -> Result<u16, ConfigError> {
    let port = match port.map(str::trim) {
        Some(p) if !p.is_empty() => p,
        _ => return Err(ConfigError::MissingPort),
    };

    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidPort(port.to_string())),
        Ok(p) => Ok(p),
    }
}

/// Parse and check the upstream base URL.
pub fn parse_upstream(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }
    upstream_target(&url)?;
    Ok(url)
}

/// Split an upstream URL into the scheme and authority used on outgoing
/// requests. Any path on the upstream URL is ignored.
pub fn upstream_target(url: &Url) -> Result<(Scheme, Authority), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason,
    };

    let scheme = Scheme::from_str(url.scheme()).map_err(|e| invalid(e.to_string()))?;
    let authority = Authority::from_str(&url[Position::BeforeHost..Position::AfterPort])
        .map_err(|e| invalid(e.to_string()))?;

    Ok((scheme, authority))
}
