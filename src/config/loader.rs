//! Configuration loading from a `.env` file or the process environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{RawSettings, ServerConfig};

/// Mode argument that selects the local `.env` file.
pub const TEST_MODE: &str = "test";

/// Default location of the `.env` file used in test mode.
pub const DEFAULT_ENV_FILE: &str = "./.env";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DIR is not set")]
    MissingDir,

    #[error("PORT is not set")]
    MissingPort,

    #[error("PORT must be an integer in 1..=65535, got {0:?}")]
    InvalidPort(String),

    #[error("URL is not set")]
    MissingUrl,

    #[error("URL {url:?} is invalid: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to read env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

/// Where the three settings are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A dotenv-style `KEY=VALUE` file.
    EnvFile(PathBuf),
    /// The process environment, unprefixed.
    Environment,
}

impl ConfigSource {
    /// Select a source from the startup mode argument.
    ///
    /// `"test"` reads `env_file`; any other mode reads the environment.
    pub fn from_mode(mode: &str, env_file: impl Into<PathBuf>) -> Self {
        if mode == TEST_MODE {
            ConfigSource::EnvFile(env_file.into())
        } else {
            ConfigSource::Environment
        }
    }

    /// Read raw settings from this source.
    pub fn read(&self) -> Result<RawSettings, ConfigError> {
        match self {
            ConfigSource::EnvFile(path) => read_env_file(path),
            ConfigSource::Environment => {
                Ok(RawSettings::from_lookup(|key| std::env::var(key).ok()))
            }
        }
    }
}

/// Parse a dotenv file without touching the process environment.
fn read_env_file(path: &Path) -> Result<RawSettings, ConfigError> {
    let mut values = HashMap::new();
    for entry in dotenvy::from_path_iter(path)? {
        let (key, value) = entry?;
        values.insert(key, value);
    }

    tracing::debug!(path = ?path, keys = values.len(), "Env file parsed");
    Ok(RawSettings::from_lookup(|key| values.get(key).cloned()))
}

/// Load and validate configuration from the given source.
pub fn load_config(source: &ConfigSource) -> Result<ServerConfig, ConfigError> {
    let raw = source.read()?;
    ServerConfig::from_settings(raw)
}
