use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use std::sync::Arc;

use crate::{
    logger::{self, LogTag},
    webserver::{
        models::{HealthResponse, RefreshResponse},
        state::AppState,
        utils::{error_response, success_response, REFRESH_FAILED},
    },
};

/// Cache management and liveness routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(cache_status))
        .route("/refresh", post(trigger_refresh))
}

/// GET /health
async fn health_check() -> Response {
    logger::debug(LogTag::Webserver, "Health check endpoint called");

    success_response(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /status
async fn cache_status(State(state): State<Arc<AppState>>) -> Response {
    let status = state.cache.status().await;

    logger::debug(
        LogTag::Webserver,
        &format!(
            "Cache status: {} item(s), next refresh in {}s, uptime {}s",
            status.item_count,
            status.seconds_until_next_refresh,
            state.uptime_seconds()
        ),
    );

    success_response(status)
}

/// POST /refresh
///
/// Forces a full refresh. Joins a refresh that is already running instead of
/// starting a second scan.
async fn trigger_refresh(State(state): State<Arc<AppState>>) -> Response {
    match state.cache.refresh().await {
        Ok(snapshot) => {
            logger::info(
                LogTag::Cache,
                &format!("Snapshot rebuilt via API request ({} records)", snapshot.len()),
            );

            success_response(RefreshResponse {
                item_count: snapshot.len(),
                captured_at: snapshot.captured_at(),
            })
        }
        Err(err) => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            REFRESH_FAILED,
            "Failed to rebuild the record snapshot",
            Some(&err.to_string()),
        ),
    }
}
