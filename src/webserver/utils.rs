/// Response helpers shared by all route handlers
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::webserver::models::{ErrorDetails, ErrorResponse};

/// Error code for rejected query parameters
pub const INVALID_FILTER: &str = "INVALID_FILTER";
/// Error code for a failed snapshot refresh
pub const REFRESH_FAILED: &str = "REFRESH_FAILED";

/// 200 with `data` as the JSON body
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// `status` with the `{ "error": { ... } }` envelope
pub fn error_response(
    status: StatusCode,
    code: &str,
    message: &str,
    details: Option<&str>,
) -> Response {
    let body = ErrorResponse {
        error: ErrorDetails {
            code: code.to_string(),
            message: message.to_string(),
            details: details.map(str::to_string),
            timestamp: Utc::now(),
        },
    };

    (status, Json(body)).into_response()
}
