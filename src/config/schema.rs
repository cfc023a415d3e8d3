//! Configuration schema definitions.
//!
//! Settings arrive as three loosely-typed strings (`DIR`, `PORT`, `URL`) and
//! leave as a [`ServerConfig`] whose invariants hold for the process lifetime.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use url::Url;

use crate::config::loader::ConfigError;
use crate::config::validation::{parse_port, parse_upstream, require_dir};

/// Setting names as they appear in the environment or `.env` file.
pub const DIR_KEY: &str = "DIR";
pub const PORT_KEY: &str = "PORT";
pub const URL_KEY: &str = "URL";

/// Unvalidated settings as read from a configuration source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSettings {
    /// Filesystem root for static assets.
    pub dir: Option<String>,
    /// Listen port, still in string form.
    pub port: Option<String>,
    /// Upstream base URL.
    pub url: Option<String>,
}

impl RawSettings {
    /// Build settings by looking each key up through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            dir: lookup(DIR_KEY),
            port: lookup(PORT_KEY),
            url: lookup(URL_KEY),
        }
    }
}

/// Validated server configuration.
///
/// Constructed once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    root_dir: PathBuf,
    listen_port: u16,
    upstream_url: Url,
    /// The upstream exactly as configured. This is what goes into `Origin`.
    upstream_origin: String,
}

impl ServerConfig {
    /// Create a config from already-typed values.
    pub fn new(
        root_dir: impl Into<PathBuf>,
        listen_port: u16,
        upstream: &str,
    ) -> Result<Self, ConfigError> {
        let root_dir = root_dir.into();
        if root_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingDir);
        }
        if listen_port == 0 {
            return Err(ConfigError::InvalidPort("0".to_string()));
        }
        let upstream_url = parse_upstream(upstream)?;

        Ok(Self {
            root_dir,
            listen_port,
            upstream_url,
            upstream_origin: upstream.to_string(),
        })
    }

    /// Validate raw settings into a config.
    pub fn from_settings(raw: RawSettings) -> Result<Self, ConfigError> {
        let dir = require_dir(raw.dir.as_deref())?;
        let port = parse_port(raw.port.as_deref())?;
        let url = raw
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::MissingUrl)?;

        Self::new(dir, port, url)
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn listen_port(&self) -> u16 {
        self.listen_port
    }

    pub fn upstream_url(&self) -> &Url {
        &self.upstream_url
    }

    pub fn upstream_origin(&self) -> &str {
        &self.upstream_origin
    }

    /// Address the listener binds: all interfaces on the configured port.
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.listen_port))
    }
}
