//! Health and readiness probes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness probe: Firestore must be reachable. A missing probe
/// document still counts as reachable.
pub async fn ready(State(state): State<AppState>) -> StatusCode {
    let firestore = state.firestore.clone();
    let reachable = firestore
        .with_retry("ready_check", || async {
            firestore.get_document("_health", "_check").await.map(|_| ())
        })
        .await;

    match reachable {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
