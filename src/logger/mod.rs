//! Structured, tagged logging for minestats
//!
//! ```rust,ignore
//! use minestats::logger::{self, LogTag};
//!
//! logger::info(LogTag::Cache, "Snapshot refreshed");
//! logger::debug(LogTag::Store, "Fetched page 3"); // Only with --debug-store
//! logger::verbose(LogTag::Filter, "Stage counts: ..."); // Only with --verbose
//! ```
//!
//! Call [`init_with`] once at startup.

mod bridge;
mod config;
mod core;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, set_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Install `config` and the `log` bridge. Call once at startup.
pub fn init_with(config: LoggerConfig) {
    set_logger_config(config);
    bridge::install();
}

/// Always shown
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Only shown when `--debug-<tag>` is set for this tag
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Only shown with `--verbose`
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Cheap check so callers can skip building expensive debug messages
pub fn is_debug_enabled(tag: LogTag) -> bool {
    core::should_log(&tag, LogLevel::Debug)
}
