/// Command-line arguments for the minestats binary
///
/// Flags either override loaded configuration (`--host`, `--store`, ...) or
/// feed the logger (`--debug-<tag>`, `--verbose`, `--quiet`, `--no-color`).
use clap::Parser;

use crate::config::{apply_env_overrides, load_config_file, Config, CONFIG_FILE_PATH};
use crate::errors::ConfigError;
use crate::logger::{LogLevel, LogTag, LoggerConfig};

#[derive(Debug, Clone, Parser)]
#[command(name = "minestats")]
#[command(about = "Read-only query API over minesweeper game records", long_about = None)]
pub struct Args {
    /// Path to the TOML configuration file
    #[arg(long, default_value = CONFIG_FILE_PATH)]
    pub config: String,

    /// Bind host (overrides webserver.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (overrides webserver.port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Backing store kind: http or csv
    #[arg(long)]
    pub store: Option<String>,

    /// CSV export to serve (implies --store csv)
    #[arg(long)]
    pub csv: Option<String>,

    /// Snapshot lifetime in seconds
    #[arg(long)]
    pub refresh_interval: Option<u64>,

    /// Skip loading the snapshot before serving
    #[arg(long)]
    pub no_warm: bool,

    #[arg(long)]
    pub debug_cache: bool,

    #[arg(long)]
    pub debug_store: bool,

    #[arg(long)]
    pub debug_filter: bool,

    #[arg(long)]
    pub debug_webserver: bool,

    /// Debug output from dependencies using the `log` facade
    #[arg(long)]
    pub debug_deps: bool,

    /// Show everything, including verbose output
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only errors and warnings
    #[arg(long)]
    pub quiet: bool,

    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    /// Logger settings implied by the verbosity and debug flags
    pub fn logger_config(&self) -> LoggerConfig {
        let mut config = LoggerConfig::default();

        if self.verbose {
            config.min_level = LogLevel::Verbose;
        } else if self.quiet {
            config.min_level = LogLevel::Warning;
        }
        config.use_colors = !self.no_color;

        let debug_flags = [
            (self.debug_cache, LogTag::Cache),
            (self.debug_store, LogTag::Store),
            (self.debug_filter, LogTag::Filter),
            (self.debug_webserver, LogTag::Webserver),
            (self.debug_deps, LogTag::Deps),
        ];
        for (enabled, tag) in debug_flags {
            if enabled {
                config.enable_debug(tag);
            }
        }

        config
    }

    /// Apply command-line overrides on top of file and environment config
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.webserver.host = host.clone();
        }
        if let Some(port) = self.port {
            config.webserver.port = port;
        }
        if let Some(kind) = &self.store {
            config.store.kind = kind.to_lowercase();
        }
        if let Some(path) = &self.csv {
            config.store.kind = "csv".to_string();
            config.store.csv_path = path.clone();
        }
        if let Some(secs) = self.refresh_interval {
            config.cache.refresh_interval_secs = secs;
        }
        if self.no_warm {
            config.cache.warm_on_startup = false;
        }
    }

    /// Final configuration: file, then `lookup` (the environment), then
    /// these flags, validated once at the end
    pub fn resolve_config<F>(&self, lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = load_config_file(&self.config)?;
        apply_env_overrides(&mut config, lookup)?;
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Names of the enabled `--debug-*` flags, for the startup banner
    pub fn enabled_debug_modes(&self) -> Vec<&'static str> {
        let mut modes = Vec::new();
        if self.debug_cache {
            modes.push("cache");
        }
        if self.debug_store {
            modes.push("store");
        }
        if self.debug_filter {
            modes.push("filter");
        }
        if self.debug_webserver {
            modes.push("webserver");
        }
        if self.debug_deps {
            modes.push("deps");
        }
        modes
    }
}
