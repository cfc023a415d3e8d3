//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → dispatcher.rs (route decision)
//!     → matcher.rs (literal "/api" prefix test)
//!     → Route::Proxy  → http::proxy (prefix stripped, forwarded upstream)
//!     → Route::Static → http::static_files (file under the root dir)
//! ```
//!
//! # Design Decisions
//! - Built once at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same path always takes the same route

pub mod dispatcher;
pub mod matcher;

pub use dispatcher::{Dispatcher, Route, API_PREFIX};
pub use matcher::{Matcher, PathPrefixMatcher};
