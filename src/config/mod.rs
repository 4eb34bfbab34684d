//! Configuration system
//!
//! Sections are declared with `config_struct!` (see `macros.rs`) and loaded
//! from TOML with environment overrides on top.

mod macros;
mod schemas;
mod utils;

pub use schemas::{CacheConfig, Config, StoreConfig, WebserverConfig};
pub use utils::{apply_env_overrides, load_config_file, CONFIG_FILE_PATH};
