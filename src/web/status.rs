//! Health and status handlers.

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::trace;
use ts_rs::TS;

use crate::search::CoalescerStats;
use crate::state::{AppState, ServiceStatus};

#[derive(Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CacheInfo {
    pub entries: usize,
    pub fresh_entries: usize,
    pub in_flight: usize,
    pub ttl_secs: u64,
}

#[derive(Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StatusResponse {
    status: ServiceStatus,
    version: String,
    commit: String,
    uptime_secs: u64,
    cache: CacheInfo,
}

/// Health check endpoint
pub(super) async fn health() -> Json<Value> {
    trace!("health check requested");
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Version, upstream configuration, and cache counters.
pub(super) async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let CoalescerStats {
        entries,
        fresh_entries,
        in_flight,
    } = state.search.stats();

    Json(StatusResponse {
        status: state.upstream_status(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: env!("GIT_COMMIT_HASH").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        cache: CacheInfo {
            entries,
            fresh_entries,
            in_flight,
            ttl_secs: state.search.ttl().as_secs(),
        },
    })
}
