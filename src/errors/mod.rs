/// Error taxonomy for minestats
///
/// - `ValidationError`: malformed query input, raised at the boundary
/// - `StoreError`: a backing-store page fetch failed
/// - `CacheError`: a full refresh was abandoned
/// - `ConfigError`: configuration could not be loaded
use thiserror::Error;

// =============================================================================
// VALIDATION ERRORS (boundary, never retried)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid solved flag '{value}' (expected true or false)")]
    InvalidSolvedFlag { value: String },

    #[error("invalid difficulty '{value}' (expected beginner, intermediate or expert)")]
    InvalidDifficulty { value: String },

    #[error("parameter '{param}' must be a finite number, got '{value}'")]
    InvalidNumber { param: &'static str, value: String },

    #[error("parameter '{param}' must be a date in YYYY-MM-DD format, got '{value}'")]
    InvalidDate { param: &'static str, value: String },
}

impl ValidationError {
    /// Name of the offending query parameter
    pub fn param(&self) -> &'static str {
        match self {
            ValidationError::InvalidSolvedFlag { .. } => "solved",
            ValidationError::InvalidDifficulty { .. } => "difficulty",
            ValidationError::InvalidNumber { param, .. } => param,
            ValidationError::InvalidDate { param, .. } => param,
        }
    }
}

// =============================================================================
// BACKING STORE ERRORS
// =============================================================================

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    #[error("HTTP {status} from {endpoint}: {body}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode page: {0}")]
    Decode(String),

    #[error("invalid continuation token '{0}'")]
    InvalidToken(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("CSV error: {0}")]
    Csv(String),
}

impl StoreError {
    /// Transient failures worth retrying inside a page source
    pub fn is_recoverable(&self) -> bool {
        match self {
            StoreError::Request { .. } => true,
            StoreError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

impl From<csv::Error> for StoreError {
    fn from(e: csv::Error) -> Self {
        StoreError::Csv(e.to_string())
    }
}

// =============================================================================
// CACHE ERRORS
// =============================================================================

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("snapshot refresh failed after {pages_fetched} page(s): {source}")]
    RefreshFailed {
        pages_fetched: usize,
        #[source]
        source: StoreError,
    },
}

// =============================================================================
// CONFIGURATION ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config field '{field}': {reason}")]
    Invalid { field: String, reason: String },
}
