//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper HTTP/1.1, Axum router, timeouts)
//!     → routing::Dispatcher
//!         → static_files.rs (files under the root dir)
//!         → proxy.rs
//!             → request.rs (strip prefix, retarget, Origin)
//!             → upstream
//!             → response.rs (Control-Allow-Origin, hop-by-hop)
//!     → Send to client
//! ```

pub mod headers;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;
pub mod static_files;

pub use proxy::{ProxyError, ProxyForwarder};
pub use server::HttpServer;
pub use static_files::{LookupError, StaticFiles};
