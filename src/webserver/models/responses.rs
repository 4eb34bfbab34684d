/// API response type definitions
///
/// Record listings and `CacheStatus` serialize directly; the shapes below
/// cover the remaining endpoints and the shared error envelope.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::LatestTimestamp;

/// Simple health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// GET /latest
#[derive(Debug, Clone, Serialize)]
pub struct LatestResponse {
    pub latest_timestamp: LatestTimestamp,
}

/// POST /refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub item_count: usize,
    pub captured_at: DateTime<Utc>,
}

/// Generic error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}
