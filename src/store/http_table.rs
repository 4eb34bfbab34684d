/// Remote table store accessed over HTTP
///
/// Scan endpoint:
///   GET {endpoint}/tables/{table}/items?limit={page_size}[&continuation={token}]
///
/// Response body:
///   { "items": [ <record>, ... ], "next_token": "<opaque>" | null }
///
/// Transient failures (connection errors, 429, 5xx) are retried with
/// exponential backoff; anything else fails the page immediately.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{Page, PageSource};
use crate::config::StoreConfig;
use crate::errors::StoreError;
use crate::logger::{self, LogTag};
use crate::records::GameRecord;

/// Ceiling for a single retry delay
pub const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(5 * 60);

pub struct HttpTableSource {
    client: Client,
    endpoint: String,
    table: String,
    api_key: Option<String>,
    page_size: usize,
    timeout: Duration,
    max_retries: u32,
    retry_backoff: Duration,
}

#[derive(Debug, Deserialize)]
struct ScanResponse {
    items: Vec<GameRecord>,
    #[serde(default)]
    next_token: Option<String>,
}

impl HttpTableSource {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        if config.endpoint.trim().is_empty() {
            return Err(StoreError::Request {
                endpoint: String::new(),
                message: "store endpoint is not configured".to_string(),
            });
        }

        let client = Client::builder()
            .user_agent(concat!("minestats/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StoreError::Request {
                endpoint: config.endpoint.clone(),
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            table: config.table.clone(),
            api_key: (!config.api_key.is_empty()).then(|| config.api_key.clone()),
            page_size: config.page_size.max(1),
            timeout: Duration::from_secs(config.request_timeout_secs.max(1)),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    /// `retry_backoff * 2^attempt`, capped at [`MAX_RETRY_BACKOFF`]
    fn backoff_for(&self, attempt: u32) -> Duration {
        self.retry_backoff
            .checked_mul(2u32.saturating_pow(attempt))
            .map_or(MAX_RETRY_BACKOFF, |delay| delay.min(MAX_RETRY_BACKOFF))
    }

    fn scan_url(&self) -> String {
        format!("{}/tables/{}/items", self.endpoint, self.table)
    }

    async fn fetch_once(&self, continuation: Option<&str>) -> Result<Page, StoreError> {
        let url = self.scan_url();
        logger::verbose(
            LogTag::Store,
            &format!("GET {} (continuation={:?})", url, continuation),
        );

        let mut request = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .query(&[("limit", self.page_size.to_string())]);
        if let Some(token) = continuation {
            request = request.query(&[("continuation", token)]);
        }
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| StoreError::Request {
            endpoint: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::HttpStatus {
                endpoint: url,
                status: status.as_u16(),
                body,
            });
        }

        let data: ScanResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("{}: {}", url, e)))?;

        Ok(Page {
            records: data.items,
            // Some stores send "" instead of null on the last page
            next_token: data.next_token.filter(|token| !token.is_empty()),
        })
    }
}

#[async_trait]
impl PageSource for HttpTableSource {
    fn describe(&self) -> String {
        format!("http table '{}' at {}", self.table, self.endpoint)
    }

    async fn scan_page(&self, continuation: Option<String>) -> Result<Page, StoreError> {
        let mut attempt: u32 = 0;
        loop {
            match self.fetch_once(continuation.as_deref()).await {
                Ok(page) => {
                    logger::debug(
                        LogTag::Store,
                        &format!(
                            "Fetched {} record(s) from '{}' (more={})",
                            page.records.len(),
                            self.table,
                            page.next_token.is_some()
                        ),
                    );
                    return Ok(page);
                }
                Err(err) if err.is_recoverable() && attempt < self.max_retries => {
                    let backoff = self.backoff_for(attempt);
                    attempt += 1;
                    logger::warning(
                        LogTag::Store,
                        &format!(
                            "Page fetch failed ({}), retry {}/{} in {}ms",
                            err,
                            attempt,
                            self.max_retries,
                            backoff.as_millis()
                        ),
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(all(test, feature = "web"))]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    #[derive(Clone)]
    struct FakeStore {
        calls: Arc<AtomicUsize>,
        fail_first: usize,
    }

    fn item(board_3bv: f64) -> serde_json::Value {
        json!({
            "solved": true,
            "difficulty": "expert",
            "board_3bv": board_3bv,
            "completed_3bv": board_3bv,
            "efficiency": 70.0,
            "timestamp": "2024-05-01T10:00:00Z"
        })
    }

    async fn scan(
        State(store): State<FakeStore>,
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
    ) -> Response {
        let call = store.calls.fetch_add(1, Ordering::SeqCst);
        if call < store.fail_first {
            return (StatusCode::SERVICE_UNAVAILABLE, "busy").into_response();
        }
        if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer secret") {
            return (StatusCode::UNAUTHORIZED, "no key").into_response();
        }
        assert_eq!(params.get("limit").map(String::as_str), Some("2"));

        match params.get("continuation").map(String::as_str) {
            None => Json(json!({ "items": [item(10.0), item(20.0)], "next_token": "p2" })),
            Some("p2") => Json(json!({ "items": [item(30.0)], "next_token": "" })),
            Some(_) => Json(json!({ "items": [], "next_token": null })),
        }
        .into_response()
    }

    async fn spawn_store(fail_first: usize) -> (String, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/tables/games/items", get(scan))
            .with_state(FakeStore {
                calls: calls.clone(),
                fail_first,
            });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), calls)
    }

    fn config(endpoint: String) -> StoreConfig {
        StoreConfig {
            kind: "http".to_string(),
            endpoint,
            table: "games".to_string(),
            api_key: "secret".to_string(),
            page_size: 2,
            max_retries: 2,
            retry_backoff_ms: 1,
            ..StoreConfig::default()
        }
    }

    #[tokio::test]
    async fn test_scans_pages_until_token_runs_out() {
        let (endpoint, _) = spawn_store(0).await;
        let source = HttpTableSource::new(&config(endpoint)).unwrap();

        let first = source.scan_page(None).await.unwrap();
        assert_eq!(first.records.len(), 2);
        assert_eq!(first.next_token.as_deref(), Some("p2"));

        let second = source.scan_page(first.next_token).await.unwrap();
        assert_eq!(second.records.len(), 1);
        assert_eq!(second.records[0].board_3bv, 30.0);
        assert!(second.next_token.is_none());
    }

    #[tokio::test]
    async fn test_retries_transient_errors() {
        let (endpoint, calls) = spawn_store(2).await;
        let source = HttpTableSource::new(&config(endpoint)).unwrap();

        let page = source.scan_page(None).await.unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let (endpoint, calls) = spawn_store(10).await;
        let source = HttpTableSource::new(&config(endpoint)).unwrap();

        let err = source.scan_page(None).await.unwrap_err();
        assert!(matches!(err, StoreError::HttpStatus { status: 503, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let (endpoint, calls) = spawn_store(0).await;
        let mut cfg = config(endpoint);
        cfg.api_key = "wrong".to_string();
        let source = HttpTableSource::new(&cfg).unwrap();

        let err = source.scan_page(None).await.unwrap_err();
        assert!(matches!(err, StoreError::HttpStatus { status: 401, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_doubles_and_saturates() {
        let mut cfg = config("http://127.0.0.1:1".to_string());
        cfg.retry_backoff_ms = 100;
        let source = HttpTableSource::new(&cfg).unwrap();
        assert_eq!(source.backoff_for(0), Duration::from_millis(100));
        assert_eq!(source.backoff_for(3), Duration::from_millis(800));

        cfg.retry_backoff_ms = u64::MAX;
        let source = HttpTableSource::new(&cfg).unwrap();
        assert_eq!(source.backoff_for(0), MAX_RETRY_BACKOFF);
        assert_eq!(source.backoff_for(31), MAX_RETRY_BACKOFF);
    }

    #[test]
    fn test_requires_endpoint() {
        let cfg = StoreConfig {
            endpoint: "  ".to_string(),
            ..StoreConfig::default()
        };
        assert!(HttpTableSource::new(&cfg).is_err());
    }
}
