/// Configuration schemas, each section defined once with its defaults
use crate::config_struct;

// ============================================================================
// BACKING STORE
// ============================================================================

config_struct! {
    /// Where the game records come from
    pub struct StoreConfig {
        /// "http" (remote table) or "csv" (local export)
        kind: String = "http".to_string(),

        // Remote table store
        endpoint: String = String::new(),
        table: String = "games".to_string(),
        /// Sent as a bearer token when non-empty
        api_key: String = String::new(),
        page_size: usize = 500,
        request_timeout_secs: u64 = 10,
        max_retries: u32 = 3,
        retry_backoff_ms: u64 = 500,

        // CSV export; empty path = first *.csv in data_dir
        csv_path: String = String::new(),
        data_dir: String = ".".to_string(),
    }
}

// ============================================================================
// SNAPSHOT CACHE
// ============================================================================

config_struct! {
    pub struct CacheConfig {
        /// Snapshot age after which the next request triggers a full refresh
        refresh_interval_secs: u64 = 24 * 60 * 60,
        /// Load the snapshot before accepting requests
        warm_on_startup: bool = true,
    }
}

// ============================================================================
// WEBSERVER
// ============================================================================

config_struct! {
    pub struct WebserverConfig {
        host: String = "127.0.0.1".to_string(),
        port: u16 = 8080,
        /// Allow any origin (the public stats page is served from elsewhere)
        cors_allow_any: bool = true,
    }
}

// ============================================================================
// ROOT
// ============================================================================

config_struct! {
    pub struct Config {
        store: StoreConfig = StoreConfig::default(),
        cache: CacheConfig = CacheConfig::default(),
        webserver: WebserverConfig = WebserverConfig::default(),
    }
}
