//! Static asset serving for the single-page application.
//!
//! # Responsibilities
//! - Resolve a request path to a file under the root directory
//! - Answer lookups that fail with 500 and the raw error text
//! - Hand existing paths to `ServeDir` for content type, conditional and
//!   range requests, and directory index handling
//! - List directories that have no `index.html`
//!
//! # Design Decisions
//! - A missing file is a 500, not a 404. Clients depend on this status
//! - `..` segments are rejected before touching the filesystem, so nothing
//!   outside the root is ever stat'ed
//! - The path is percent-decoded before the join, matching how `ServeDir`
//!   decodes it afterwards
//! - Every method is answered as if it were GET; the request body is ignored

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use thiserror::Error;
use tower::ServiceExt;
use tower_http::services::ServeDir;

/// Why a request path could not be resolved to something on disk.
///
/// The `Display` output is sent to the client as the response body.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("stat {path}: invalid path encoding")]
    InvalidEncoding { path: String },

    #[error("stat {path}: path escapes the root directory")]
    Traversal { path: String },

    #[error("stat {}: {}", .path.display(), .source)]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "Static lookup failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Bytes escaped in directory listing links.
const LINK: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// Serves files below a fixed root directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    serve_dir: ServeDir,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let serve_dir = ServeDir::new(&root).append_index_html_on_directories(true);
        Self { root, serve_dir }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `request_path` onto the root without touching the filesystem.
    pub fn resolve(&self, request_path: &str) -> Result<PathBuf, LookupError> {
        let decoded = percent_decode_str(request_path)
            .decode_utf8()
            .map_err(|_| LookupError::InvalidEncoding {
                path: request_path.to_string(),
            })?;

        let mut joined = self.root.clone();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(LookupError::Traversal {
                        path: request_path.to_string(),
                    })
                }
                // A backslash would be a separator on Windows.
                s if s.contains('\\') => {
                    return Err(LookupError::Traversal {
                        path: request_path.to_string(),
                    })
                }
                s => joined.push(s),
            }
        }

        Ok(joined)
    }

    /// Resolve `request_path` and check that something exists there.
    pub async fn lookup(&self, request_path: &str) -> Result<(PathBuf, Metadata), LookupError> {
        let path = self.resolve(request_path)?;
        match tokio::fs::metadata(&path).await {
            Ok(metadata) => Ok((path, metadata)),
            Err(source) => Err(LookupError::Stat { path, source }),
        }
    }

    /// Serve the file named by the request path.
    pub async fn serve(&self, mut req: Request<Body>) -> Response {
        let (path, metadata) = match self.lookup(req.uri().path()).await {
            Ok(found) => found,
            Err(e) => return e.into_response(),
        };

        // Without the trailing slash ServeDir redirects first.
        if metadata.is_dir() && req.uri().path().ends_with('/') && !has_index(&path).await {
            return match list_dir(&path).await {
                Ok(html) => Html(html).into_response(),
                Err(source) => LookupError::Stat { path, source }.into_response(),
            };
        }

        if req.method() != Method::GET && req.method() != Method::HEAD {
            *req.method_mut() = Method::GET;
        }

        match self.serve_dir.clone().oneshot(req).await {
            Ok(res) => res.map(Body::new),
            Err(never) => match never {},
        }
    }
}

async fn has_index(dir: &Path) -> bool {
    tokio::fs::metadata(dir.join("index.html"))
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Render a sorted HTML listing of `dir`. Subdirectories end in `/`.
async fn list_dir(dir: &Path) -> io::Result<String> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().await?.is_dir() {
            name.push('/');
        }
        names.push(name);
    }
    names.sort();

    let mut html = String::from(
        "<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n",
    );
    for name in &names {
        html.push_str(&format!(
            "<a href=\"{}\">{}</a>\n",
            utf8_percent_encode(name, LINK),
            escape_html(name)
        ));
    }
    html.push_str("</pre>\n");
    Ok(html)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
