// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

use crate::models::{ServerSnapshot, SystemInfo};
use crate::monitor::SnapshotAggregator;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) snapshot_tx: broadcast::Sender<ServerSnapshot>,
    pub(crate) aggregator: Arc<SnapshotAggregator>,
    pub(crate) system_info: Arc<SystemInfo>,
    pub(crate) ws_connections: Arc<AtomicUsize>,
}

pub fn app(
    snapshot_tx: broadcast::Sender<ServerSnapshot>,
    aggregator: Arc<SnapshotAggregator>,
    system_info: Arc<SystemInfo>,
    ws_connections: Arc<AtomicUsize>,
) -> Router {
    let state = AppState {
        snapshot_tx,
        aggregator,
        system_info,
        ws_connections,
    };
    Router::new()
        .route("/", get(|| async { "servermon: web server host monitor" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/info", get(http::api_info_handler)) // GET /api/info
        .route("/api/snapshot", get(http::api_snapshot_handler)) // GET /api/snapshot
        .route("/ws/snapshot", get(ws::ws_snapshot)) // WS /ws/snapshot
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
