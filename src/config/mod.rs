//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! mode argument
//!     → loader.rs (pick source: .env file or process environment)
//!     → RawSettings { DIR, PORT, URL } as optional strings
//!     → validation.rs (presence, port range, upstream URL shape)
//!     → ServerConfig (validated, immutable)
//!     → passed by reference into the dispatcher and proxy forwarder
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - No global lookups: request handling only sees what it was constructed with
//! - Any missing or zero-valued setting is fatal before a socket is opened

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, ConfigSource, DEFAULT_ENV_FILE, TEST_MODE};
pub use schema::{RawSettings, ServerConfig};
