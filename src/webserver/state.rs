/// Shared application state for the webserver
///
/// Holds the snapshot cache every data route reads through. There is no
/// process-wide cache; whoever builds the router decides which one it serves.
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::cache::SnapshotCache;
use crate::config::WebserverConfig;

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<SnapshotCache>,

    /// Webserver configuration
    pub config: Arc<WebserverConfig>,

    /// Server startup time
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(cache: Arc<SnapshotCache>, config: WebserverConfig) -> Self {
        Self {
            cache,
            config: Arc::new(config),
            startup_time: Utc::now(),
        }
    }

    /// Seconds since the state was created
    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.startup_time).num_seconds().max(0) as u64
    }
}
