//! Liveness endpoint.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Free slots in the global plugin execution pool.
    pub plugin_slots_available: usize,
    /// Dispatch and execution tasks that have not finished yet.
    pub plugin_tasks_in_flight: usize,
}

/// GET /health
///
/// Never fails: an unreachable database is reported, not returned as an error.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = keystone_db::health_check(&state.pool).await.is_ok();

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        plugin_slots_available: state.dispatcher.available_slots(),
        plugin_tasks_in_flight: state.dispatcher.in_flight(),
    })
}

/// Health routes, merged at the root rather than under `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
