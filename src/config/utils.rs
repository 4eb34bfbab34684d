/// Configuration loading: TOML file, then environment overrides.
///
/// Validation runs once, after every override layer (including the command
/// line) has been applied; see `arguments::Args::resolve_config`.
use std::path::Path;

use super::schemas::Config;
use crate::cache::MAX_REFRESH_INTERVAL_SECS;
use crate::errors::ConfigError;
use crate::logger::{self, LogTag};

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

/// Upper bounds enforced by `Config::validate`
pub const MAX_RETRIES: u32 = 10;
pub const MAX_RETRY_BACKOFF_MS: u64 = 60_000;
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

/// Environment variables that override file values
pub const ENV_STORE_KIND: &str = "MINESTATS_STORE_KIND";
pub const ENV_STORE_ENDPOINT: &str = "MINESTATS_STORE_ENDPOINT";
pub const ENV_STORE_TABLE: &str = "MINESTATS_STORE_TABLE";
pub const ENV_STORE_API_KEY: &str = "MINESTATS_STORE_API_KEY";
pub const ENV_CSV_PATH: &str = "MINESTATS_CSV_PATH";
pub const ENV_REFRESH_INTERVAL_SECS: &str = "MINESTATS_REFRESH_INTERVAL_SECS";
pub const ENV_HOST: &str = "MINESTATS_HOST";
pub const ENV_PORT: &str = "MINESTATS_PORT";

/// Read a TOML file; a missing file yields the defaults
pub fn load_config_file(path: &str) -> Result<Config, ConfigError> {
    if !Path::new(path).exists() {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path),
        );
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;

    let config = toml::from_str::<Config>(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })?;

    logger::info(LogTag::Config, &format!("Loaded configuration from {}", path));
    Ok(config)
}

/// Apply overrides from `lookup` (the process environment in production)
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(kind) = lookup(ENV_STORE_KIND) {
        config.store.kind = kind;
    }
    if let Some(endpoint) = lookup(ENV_STORE_ENDPOINT) {
        config.store.endpoint = endpoint;
    }
    if let Some(table) = lookup(ENV_STORE_TABLE) {
        config.store.table = table;
    }
    if let Some(key) = lookup(ENV_STORE_API_KEY) {
        config.store.api_key = key;
    }
    if let Some(path) = lookup(ENV_CSV_PATH) {
        config.store.kind = "csv".to_string();
        config.store.csv_path = path;
    }
    if let Some(raw) = lookup(ENV_REFRESH_INTERVAL_SECS) {
        config.cache.refresh_interval_secs = parse_env(ENV_REFRESH_INTERVAL_SECS, &raw)?;
    }
    if let Some(host) = lookup(ENV_HOST) {
        config.webserver.host = host;
    }
    if let Some(raw) = lookup(ENV_PORT) {
        config.webserver.port = parse_env(ENV_PORT, &raw)?;
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        field: key.to_string(),
        reason: format!("'{}' is not a valid value", raw),
    })
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        match self.store.kind.as_str() {
            "http" => {
                if self.store.endpoint.trim().is_empty() {
                    return Err(invalid("store.endpoint", "required when store.kind = \"http\""));
                }
                if self.store.table.trim().is_empty() {
                    return Err(invalid("store.table", "required when store.kind = \"http\""));
                }
            }
            "csv" => {}
            _ => return Err(invalid("store.kind", "expected \"http\" or \"csv\"")),
        }

        if self.store.page_size == 0 {
            return Err(invalid("store.page_size", "must be at least 1"));
        }
        if self.cache.refresh_interval_secs == 0 {
            return Err(invalid("cache.refresh_interval_secs", "must be at least 1"));
        }
        if self.cache.refresh_interval_secs > MAX_REFRESH_INTERVAL_SECS {
            return Err(invalid(
                "cache.refresh_interval_secs",
                &format!("must be at most {}", MAX_REFRESH_INTERVAL_SECS),
            ));
        }
        if self.store.max_retries > MAX_RETRIES {
            return Err(invalid(
                "store.max_retries",
                &format!("must be at most {}", MAX_RETRIES),
            ));
        }
        if self.store.retry_backoff_ms > MAX_RETRY_BACKOFF_MS {
            return Err(invalid(
                "store.retry_backoff_ms",
                &format!("must be at most {}", MAX_RETRY_BACKOFF_MS),
            ));
        }
        if self.store.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(invalid(
                "store.request_timeout_secs",
                &format!("must be at most {}", MAX_REQUEST_TIMEOUT_SECS),
            ));
        }

        Ok(())
    }
}
