// GET handlers: version, api/info, api/snapshot

use axum::http::StatusCode;
use axum::{extract::State, response::IntoResponse};

use super::AppState;
use crate::version::{NAME, VERSION};

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/info — returns static host identity (fetched once at startup).
pub(super) async fn api_info_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.system_info.as_ref().clone())
}

/// GET /api/snapshot — runs the refresh pipeline and returns the current snapshot.
/// Transient counter churn is absorbed by the aggregator; an error here is fatal
/// for this call (enumeration/permission failure or sustained instability).
pub(super) async fn api_snapshot_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.aggregator.get_snapshot().await {
        Ok(snapshot) => axum::Json(snapshot).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, operation = "api_snapshot", "snapshot refresh failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "snapshot refresh failed").into_response()
        }
    }
}
