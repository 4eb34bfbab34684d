/// Log tags identify the subsystem a message comes from.
///
/// Each tag has a debug key; `--debug-<key>` enables Debug output for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Cache,
    Store,
    Filter,
    Webserver,
    /// Records forwarded from dependencies through the `log` facade
    Deps,
}

impl LogTag {
    pub const ALL: [LogTag; 7] = [
        LogTag::System,
        LogTag::Config,
        LogTag::Cache,
        LogTag::Store,
        LogTag::Filter,
        LogTag::Webserver,
        LogTag::Deps,
    ];

    /// Key used in `--debug-<key>` flags
    pub fn to_debug_key(&self) -> String {
        self.to_plain_string().to_lowercase()
    }

    /// Uppercase label used in console output
    pub fn to_plain_string(&self) -> String {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Config => "CONFIG",
            LogTag::Cache => "CACHE",
            LogTag::Store => "STORE",
            LogTag::Filter => "FILTER",
            LogTag::Webserver => "WEBSERVER",
            LogTag::Deps => "DEPS",
        }
        .to_string()
    }

    pub fn from_debug_key(key: &str) -> Option<Self> {
        LogTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.to_debug_key() == key.to_lowercase())
    }
}
