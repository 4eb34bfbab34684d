use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::{
    filtering::{self, FilterParams},
    logger::{self, LogTag},
    webserver::{
        models::LatestResponse,
        state::AppState,
        utils::{error_response, success_response, INVALID_FILTER, REFRESH_FAILED},
    },
};

/// Record query routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/data", get(get_data))
        .route("/latest", get(get_latest))
}

/// GET /data
///
/// Parameters are validated before the cache is touched, so a bad query
/// never triggers a refresh.
async fn get_data(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FilterParams>, QueryRejection>,
) -> Response {
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                INVALID_FILTER,
                "Invalid filter",
                Some(&rejection.body_text()),
            );
        }
    };

    let criteria = match params.into_criteria() {
        Ok(criteria) => criteria,
        Err(err) => {
            logger::debug(
                LogTag::Webserver,
                &format!("Rejected /data query ({}): {}", err.param(), err),
            );
            return error_response(
                StatusCode::BAD_REQUEST,
                INVALID_FILTER,
                "Invalid filter",
                Some(&err.to_string()),
            );
        }
    };

    let snapshot = match state.cache.get_current_data().await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            logger::error(
                LogTag::Webserver,
                &format!("Cannot serve /data: {}", err),
            );
            return error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                REFRESH_FAILED,
                "Game records are temporarily unavailable",
                Some(&err.to_string()),
            );
        }
    };

    let records = if logger::is_debug_enabled(LogTag::Filter) {
        let (records, stats) = filtering::apply_with_stats(&snapshot, &criteria);
        logger::debug(
            LogTag::Filter,
            &format!(
                "Filtered {} -> {} record(s), rejected [{}]",
                stats.total_processed,
                stats.passed,
                stats.rejection_summary()
            ),
        );
        records
    } else {
        filtering::apply(&snapshot, &criteria)
    };

    success_response(records)
}

/// GET /latest
///
/// Reads whatever is cached; never refreshes.
async fn get_latest(State(state): State<Arc<AppState>>) -> Response {
    success_response(LatestResponse {
        latest_timestamp: state.cache.latest_timestamp().await,
    })
}
