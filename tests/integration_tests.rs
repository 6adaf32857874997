// Integration tests: HTTP and WebSocket endpoints

mod common;

use axum_test::TestServer;
use common::{MockHost, MockState, key};
use servermon::counters::names;
use servermon::models::{ServerSnapshot, SystemInfo};
use servermon::monitor::SnapshotAggregator;
use servermon::routes;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;

fn test_system_info() -> SystemInfo {
    SystemInfo {
        os_family: "Linux".into(),
        os_version: "6.1".into(),
        host_name: "web-01".into(),
        processor_name: "test-cpu".into(),
    }
}

fn test_app() -> (
    axum::Router,
    broadcast::Sender<ServerSnapshot>,
    Arc<MockHost>,
) {
    let mut state = MockState::default();
    state.all_pids = vec![1, 10];
    state.worker_pids = vec![10];
    state
        .values
        .insert(key(names::MEMORY, names::AVAILABLE_BYTES, None), 2048);
    let host = Arc::new(MockHost::new(state));
    let aggregator = Arc::new(SnapshotAggregator::new(host.clone(), host.clone()));
    let (tx, _) = broadcast::channel(10);
    let app = routes::app(
        tx.clone(),
        aggregator,
        Arc::new(test_system_info()),
        Arc::new(AtomicUsize::new(0)),
    );
    (app, tx, host)
}

/// Build TestServer with http_transport (required for WebSocket tests).
fn test_server_with_http() -> (TestServer, broadcast::Sender<ServerSnapshot>) {
    let (app, tx, _) = test_app();
    let server = TestServer::builder().http_transport().try_build(app).unwrap();
    (server, tx)
}

#[tokio::test]
async fn test_root_endpoint() {
    let (app, _, _) = test_app();
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("servermon: web server host monitor");
}

#[tokio::test]
async fn test_version_endpoint() {
    let (app, _, _) = test_app();
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json.get("name").and_then(|v| v.as_str()),
        Some("servermon")
    );
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_api_info_endpoint() {
    let (app, _, _) = test_app();
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/api/info").await;
    response.assert_status_ok();
    let info: SystemInfo = response.json();
    assert_eq!(info.host_name, "web-01");
}

#[tokio::test]
async fn test_api_snapshot_runs_the_pipeline() {
    let (app, _, host) = test_app();
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/api/snapshot").await;
    response.assert_status_ok();
    let snapshot: ServerSnapshot = response.json();
    assert_eq!(snapshot.available_memory, 2048);
    assert_eq!(snapshot.process_count, 1);
    assert_eq!(host.read_calls(), 1);
}

#[tokio::test]
async fn test_api_snapshot_reports_fatal_provider_errors() {
    let (app, _, host) = test_app();
    host.with(|s| s.fail.fatal = Some("access denied".into()));
    let server = TestServer::try_new(app).unwrap();
    let response = server.get("/api/snapshot").await;
    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
}

// --- WebSocket message tests (require http_transport + ws feature) ---
// Receive until we get valid JSON of the wanted type (server sends a welcome
// info message and may send Ping first).

async fn receive_first_json_text<T: serde::de::DeserializeOwned>(
    ws: &mut axum_test::TestWebSocket,
) -> T {
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(3);
    loop {
        let text = ws.receive_text().await;
        if let Ok(v) = serde_json::from_str::<T>(&text) {
            return v;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for JSON"
        );
    }
}

#[tokio::test]
async fn test_ws_snapshot_receives_broadcast() {
    let (server, tx) = test_server_with_http();
    let snapshot = ServerSnapshot {
        timestamp: 42,
        available_memory: 1024,
        process_count: 2,
        ..ServerSnapshot::default()
    };
    let mut ws = server
        .get_websocket("/ws/snapshot")
        .await
        .into_websocket()
        .await;
    let tx_clone = tx.clone();
    let snapshot_clone = snapshot.clone();
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        let _ = tx_clone.send(snapshot_clone);
    });
    let received: ServerSnapshot = receive_first_json_text(&mut ws).await;
    assert_eq!(received.timestamp, 42);
    assert_eq!(received.available_memory, 1024);
}
