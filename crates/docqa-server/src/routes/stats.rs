//! Cache/token usage stats routes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::error;

use crate::cache_stats::{UsageRecord, UsageSummary};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/stats/cache", get(get_cache_stats).post(record_usage))
}

/// GET /api/stats/cache — aggregate of the usage log.
async fn get_cache_stats(State(state): State<Arc<AppState>>) -> Json<UsageSummary> {
    Json(state.cache_stats.summarize())
}

/// POST /api/stats/cache — append one usage record.
async fn record_usage(
    State(state): State<Arc<AppState>>,
    Json(record): Json<UsageRecord>,
) -> (StatusCode, Json<Value>) {
    match state.cache_stats.record(&record) {
        Ok(()) => (StatusCode::OK, Json(json!({"success": true}))),
        Err(e) => {
            error!("Usage record write failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false})),
            )
        }
    }
}
