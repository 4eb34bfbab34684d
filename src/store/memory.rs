use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{Page, PageSource};
use crate::errors::StoreError;
use crate::records::GameRecord;

/// Fixed in-memory pages. Continuation tokens are page indexes.
///
/// Supports an artificial per-page delay and a one-off injected failure so
/// cache behaviour under slow or broken stores can be exercised.
pub struct MemoryPageSource {
    pages: RwLock<Vec<Vec<GameRecord>>>,
    delay: Option<Duration>,
    fail_on_page: RwLock<Option<usize>>,
    scans_started: AtomicUsize,
    pages_served: AtomicUsize,
}

impl MemoryPageSource {
    pub fn new(pages: Vec<Vec<GameRecord>>) -> Self {
        Self {
            pages: RwLock::new(pages),
            delay: None,
            fail_on_page: RwLock::new(None),
            scans_started: AtomicUsize::new(0),
            pages_served: AtomicUsize::new(0),
        }
    }

    /// Split `records` into pages of `page_size`
    pub fn from_records(records: Vec<GameRecord>, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let pages = records
            .chunks(page_size)
            .map(|chunk| chunk.to_vec())
            .collect();
        Self::new(pages)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace the stored pages (the next scan sees the new data)
    pub fn set_pages(&self, pages: Vec<Vec<GameRecord>>) {
        *self.pages.write() = pages;
    }

    /// Make every request for page `index` fail until cleared
    pub fn fail_on_page(&self, index: Option<usize>) {
        *self.fail_on_page.write() = index;
    }

    /// Number of scans started (first-page requests)
    pub fn scans_started(&self) -> usize {
        self.scans_started.load(Ordering::SeqCst)
    }

    pub fn pages_served(&self) -> usize {
        self.pages_served.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSource for MemoryPageSource {
    fn describe(&self) -> String {
        format!("memory ({} page(s))", self.pages.read().len())
    }

    async fn scan_page(&self, continuation: Option<String>) -> Result<Page, StoreError> {
        let index = match continuation {
            None => {
                self.scans_started.fetch_add(1, Ordering::SeqCst);
                0
            }
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| StoreError::InvalidToken(token.clone()))?,
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if *self.fail_on_page.read() == Some(index) {
            return Err(StoreError::Request {
                endpoint: "memory".to_string(),
                message: format!("injected failure on page {}", index),
            });
        }

        let pages = self.pages.read();
        let records = match pages.get(index) {
            Some(records) => records.clone(),
            None if index == 0 => Vec::new(),
            None => return Err(StoreError::InvalidToken(index.to_string())),
        };
        let next_token = (index + 1 < pages.len()).then(|| (index + 1).to_string());

        self.pages_served.fetch_add(1, Ordering::SeqCst);
        Ok(Page {
            records,
            next_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(n: f64) -> GameRecord {
        GameRecord::new(true, "expert", n, n, 50.0, Utc::now())
    }

    #[tokio::test]
    async fn test_pages_chain_through_tokens() {
        let source = MemoryPageSource::from_records(vec![record(1.0), record(2.0), record(3.0)], 2);

        let first = source.scan_page(None).await.unwrap();
        assert_eq!(first.records.len(), 2);
        assert_eq!(first.next_token.as_deref(), Some("1"));

        let second = source.scan_page(first.next_token).await.unwrap();
        assert_eq!(second.records.len(), 1);
        assert!(second.next_token.is_none());
        assert_eq!(source.scans_started(), 1);
        assert_eq!(source.pages_served(), 2);
    }

    #[tokio::test]
    async fn test_empty_source_yields_single_empty_page() {
        let source = MemoryPageSource::new(Vec::new());
        let page = source.scan_page(None).await.unwrap();
        assert!(page.records.is_empty());
        assert!(page.next_token.is_none());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let source = MemoryPageSource::from_records(vec![record(1.0), record(2.0)], 1);
        source.fail_on_page(Some(1));

        let first = source.scan_page(None).await.unwrap();
        assert!(source.scan_page(first.next_token).await.is_err());

        source.fail_on_page(None);
        assert!(source.scan_page(Some("1".to_string())).await.is_ok());
    }
}
