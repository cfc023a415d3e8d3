//! Startup and graceful shutdown behavior.

use std::fs;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use tokio::sync::oneshot;

use spa_proxy::config::{load_config, ConfigError, ConfigSource};
use spa_proxy::lifecycle::startup::run_until;
use spa_proxy::lifecycle::{RunningServer, ServerState, ShutdownOutcome};
use spa_proxy::{ServerConfig, Shutdown};

mod common;

#[tokio::test]
async fn test_idle_server_drains_immediately() {
    let root = common::site_dir("idle");
    let server = common::start_proxy(&root, "127.0.0.1:9".parse().unwrap(), Duration::from_secs(5)).await;

    let started = Instant::now();
    server.shutdown.trigger();
    let outcome = server.handle.await.unwrap();

    assert_eq!(outcome, ShutdownOutcome::Drained);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_in_flight_request_completes_within_grace() {
    let (upstream, mut arrivals) = common::start_observed_upstream().await;
    let root = common::site_dir("drain");
    let server = common::start_proxy(&root, upstream, Duration::from_secs(3)).await;

    let url = server.url("/api/slow?delay_ms=400");
    let request = tokio::spawn(async move { common::client().get(url).send().await });

    // The upstream has the request, so it is in flight through the proxy.
    assert_eq!(arrivals.recv().await.unwrap(), "/slow?delay_ms=400");
    server.shutdown.trigger();

    let res = request.await.unwrap().unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("x-seen-path").unwrap(), "/slow?delay_ms=400");

    assert_eq!(server.handle.await.unwrap(), ShutdownOutcome::Drained);
}

#[tokio::test]
async fn test_slow_request_cut_after_grace() {
    let (upstream, mut arrivals) = common::start_observed_upstream().await;
    let root = common::site_dir("cut");
    let server = common::start_proxy(&root, upstream, Duration::from_millis(500)).await;

    let url = server.url("/api/slow?delay_ms=10000");
    let request = tokio::spawn(async move { common::client().get(url).send().await });

    assert_eq!(arrivals.recv().await.unwrap(), "/slow?delay_ms=10000");
    let started = Instant::now();
    server.shutdown.trigger();

    assert_eq!(server.handle.await.unwrap(), ShutdownOutcome::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(3));

    // The client sees the connection close instead of a response.
    assert!(request.await.unwrap().is_err());
}

#[tokio::test]
async fn test_no_new_connections_after_shutdown() {
    let root = common::site_dir("closed");
    let server = common::start_proxy(&root, "127.0.0.1:9".parse().unwrap(), Duration::from_secs(1)).await;
    let url = server.url("/app.js");

    server.shutdown.trigger();
    server.handle.await.unwrap();

    assert!(common::client().get(url).send().await.is_err());
}

#[tokio::test]
async fn test_run_until_serves_then_stops() {
    let upstream = common::start_upstream().await;
    let root = common::site_dir("run-until");
    let port = common::unused_port();
    let config = ServerConfig::new(&root, port, &format!("http://{upstream}")).unwrap();

    let state = RunningServer::new();
    let mut states = state.subscribe();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let signal = async move {
        let _ = stop_rx.await;
    };

    let driver = async {
        states
            .wait_for(|s| *s == ServerState::Serving)
            .await
            .unwrap();

        let client = common::client();
        let res = client
            .get(format!("http://127.0.0.1:{port}/app.js"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = client
            .get(format!("http://127.0.0.1:{port}/api/ping"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.headers().get("x-seen-path").unwrap(), "/ping");

        stop_tx.send(()).unwrap();
    };

    let (outcome, ()) = tokio::join!(
        run_until(&config, signal, Shutdown::with_grace_period(Duration::from_secs(1)), &state),
        driver
    );

    assert_eq!(outcome.unwrap(), ShutdownOutcome::Drained);
    assert_eq!(state.state(), ServerState::Stopped);
}

#[tokio::test]
async fn test_bind_failure_keeps_running_until_signal() {
    let root = common::site_dir("bind-fail");
    let taken = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
    let port = taken.local_addr().unwrap().port();
    let config = ServerConfig::new(&root, port, "http://127.0.0.1:9").unwrap();

    let state = RunningServer::new();
    let mut states = state.subscribe();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let signal = async move {
        let _ = stop_rx.await;
    };

    let driver = async {
        states
            .wait_for(|s| *s == ServerState::Degraded)
            .await
            .unwrap();
        stop_tx.send(()).unwrap();
    };

    let (outcome, ()) = tokio::join!(
        run_until(&config, signal, Shutdown::new(), &state),
        driver
    );

    assert_eq!(outcome.unwrap(), ShutdownOutcome::NeverServed);
    assert_eq!(state.state(), ServerState::Stopped);
    drop(taken);
}

#[tokio::test]
async fn test_missing_setting_never_binds() {
    let port = common::unused_port();
    let env_file = std::env::temp_dir().join(format!("spa-proxy-missing-url-{}.env", std::process::id()));
    fs::write(&env_file, format!("DIR=/srv/app\nPORT={port}\n")).unwrap();

    let result = load_config(&ConfigSource::EnvFile(env_file.clone()));
    assert!(matches!(result, Err(ConfigError::MissingUrl)));

    // Nothing took the port.
    std::net::TcpListener::bind(("0.0.0.0", port)).unwrap();
    let _ = fs::remove_file(env_file);
}
