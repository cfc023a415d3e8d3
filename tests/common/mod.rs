//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use spa_proxy::lifecycle::ShutdownOutcome;
use spa_proxy::net::Listener;
use spa_proxy::{HttpServer, ServerConfig, Shutdown};

/// Request headers the mock upstream reports back as `x-seen-<name>`.
const REPORTED_HEADERS: [&str; 5] = ["origin", "host", "x-request-tag", "x-forwarded-for", "connection"];

/// Start a mock upstream on an ephemeral port.
///
/// It reports what it received: `x-seen-path` (path and query),
/// `x-seen-method`, the headers in `REPORTED_HEADERS`, and echoes the body.
/// Query parameters `delay_ms=N` and `status=N` shape the reply.
pub async fn start_upstream() -> SocketAddr {
    start_observed_upstream().await.0
}

/// Like `start_upstream`, but every request's path and query is sent on the
/// returned channel as soon as it arrives, before any delay.
pub async fn start_observed_upstream() -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let (arrivals, rx) = mpsc::unbounded_channel();
    let app = Router::new().fallback(echo).with_state(arrivals);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, rx)
}

async fn echo(State(arrivals): State<mpsc::UnboundedSender<String>>, req: Request<Body>) -> Response {
    let seen_path = req.uri().path_and_query().map(|p| p.as_str()).unwrap_or("/").to_string();
    let _ = arrivals.send(seen_path.clone());

    let mut delay_ms = 0;
    let mut status = StatusCode::OK;
    for pair in req.uri().query().unwrap_or_default().split('&') {
        match pair.split_once('=') {
            Some(("delay_ms", v)) => delay_ms = v.parse().unwrap(),
            Some(("status", v)) => status = StatusCode::from_u16(v.parse().unwrap()).unwrap(),
            _ => {}
        }
    }

    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    let mut res = Response::builder()
        .status(status)
        .header("x-seen-method", req.method().as_str())
        .header("x-seen-path", seen_path);
    for name in REPORTED_HEADERS {
        if let Some(value) = req.headers().get(name) {
            res = res.header(format!("x-seen-{name}"), value.clone());
        }
    }

    let body = axum::body::to_bytes(req.into_body(), usize::MAX).await.unwrap();
    res.body(Body::from(body)).unwrap()
}

/// A port nothing is listening on.
pub fn unused_port() -> u16 {
    let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    l.local_addr().unwrap().port()
}

/// Create a small site under the OS temp dir.
///
/// ```text
/// index.html
/// app.js
/// styles/site.css
/// assets/index.html
/// my file.txt
/// noindex/a.txt
/// noindex/sub/
/// ```
pub fn site_dir(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("spa-proxy-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(root.join("styles")).unwrap();
    fs::create_dir_all(root.join("assets")).unwrap();
    fs::create_dir_all(root.join("noindex/sub")).unwrap();

    fs::write(root.join("index.html"), "<!doctype html><title>spa</title>").unwrap();
    fs::write(root.join("app.js"), "console.log('spa');").unwrap();
    fs::write(root.join("styles/site.css"), "body { margin: 0; }").unwrap();
    fs::write(root.join("assets/index.html"), "assets index").unwrap();
    fs::write(root.join("my file.txt"), "spaced").unwrap();
    fs::write(root.join("noindex/a.txt"), "a").unwrap();

    root
}

/// A proxy server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<ShutdownOutcome>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the proxy serving `root` and forwarding `/api` to `upstream`.
pub async fn start_proxy(root: &Path, upstream: SocketAddr, grace_period: Duration) -> TestServer {
    let config = ServerConfig::new(root, 8080, &format!("http://{upstream}")).unwrap();
    let server = HttpServer::new(&config).unwrap();
    let listener = Listener::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::with_grace_period(grace_period);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe(), grace_period));

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// Client that never goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
