/// Logger configuration: minimum level plus per-tag debug switches.
///
/// Held in a process-wide slot because log calls come from every layer.
/// The binary fills it from its parsed arguments at startup.
use std::collections::HashSet;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::levels::LogLevel;
use super::tags::LogTag;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Messages above this level are dropped (Debug has an extra per-tag gate)
    pub min_level: LogLevel,
    /// Tags with Debug output enabled (keys as in `--debug-<key>`)
    pub debug_tags: HashSet<String>,
    /// Print colored output (disabled when stdout is piped into a file)
    pub use_colors: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            use_colors: true,
        }
    }
}

impl LoggerConfig {
    /// Enable Debug output for `tag`
    pub fn enable_debug(&mut self, tag: LogTag) {
        self.debug_tags.insert(tag.to_debug_key());
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    LOGGER_CONFIG.read().debug_tags.contains(&tag.to_debug_key())
}
