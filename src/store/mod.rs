//! Backing-store page sources
//!
//! The snapshot cache only knows how to ask for "the next page". Each source
//! decides how pages map onto its storage and owns its own timeout/retry
//! policy.

mod csv_file;
mod http_table;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::StoreConfig;
use crate::errors::{ConfigError, StoreError};
use crate::logger::{self, LogTag};
use crate::records::GameRecord;

pub use csv_file::CsvFileSource;
pub use http_table::HttpTableSource;
pub use memory::MemoryPageSource;

/// One page of a full scan. `next_token == None` ends the scan.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub records: Vec<GameRecord>,
    pub next_token: Option<String>,
}

#[async_trait]
pub trait PageSource: Send + Sync {
    /// Short description used in logs and status output
    fn describe(&self) -> String;

    /// Fetch the page following `continuation` (`None` = first page)
    async fn scan_page(&self, continuation: Option<String>) -> Result<Page, StoreError>;
}

/// Build the page source selected by `store.kind`
pub fn build_source(config: &StoreConfig) -> Result<Arc<dyn PageSource>, ConfigError> {
    let source: Arc<dyn PageSource> = match config.kind.as_str() {
        "http" => Arc::new(HttpTableSource::new(config).map_err(|e| ConfigError::Invalid {
            field: "store.endpoint".to_string(),
            reason: e.to_string(),
        })?),
        "csv" => {
            let source = if config.csv_path.is_empty() {
                CsvFileSource::discover(&config.data_dir, config.page_size).map_err(|e| {
                    ConfigError::Invalid {
                        field: "store.data_dir".to_string(),
                        reason: e.to_string(),
                    }
                })?
            } else {
                CsvFileSource::new(&config.csv_path, config.page_size)
            };
            Arc::new(source)
        }
        other => {
            return Err(ConfigError::Invalid {
                field: "store.kind".to_string(),
                reason: format!("unknown store kind '{}' (expected http or csv)", other),
            })
        }
    };

    logger::info(
        LogTag::Store,
        &format!("Using backing store: {}", source.describe()),
    );

    Ok(source)
}
