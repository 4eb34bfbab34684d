/// Forwards records emitted through the `log` facade (reqwest, hyper, ...)
/// into the tagged logger under `LogTag::Deps`.
use super::core::{log_internal, should_log};
use super::levels::LogLevel;
use super::tags::LogTag;

struct LogBridge;

static BRIDGE: LogBridge = LogBridge;

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        should_log(&LogTag::Deps, LogLevel::from_log_level(metadata.level()))
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = format!("{}: {}", record.target(), record.args());
        log_internal(LogTag::Deps, LogLevel::from_log_level(record.level()), &message);
    }

    fn flush(&self) {}
}

/// Install the bridge; a second call is a no-op
pub fn install() {
    if log::set_logger(&BRIDGE).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
}
