use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use super::clock::{Clock, SystemClock};
use super::snapshot::{LatestTimestamp, Snapshot};
use crate::errors::CacheError;
use crate::logger::{self, LogTag};
use crate::store::PageSource;

/// Default snapshot lifetime
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 24 * 60 * 60;
/// Longest accepted snapshot lifetime (one year)
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

/// Read-through snapshot cache over a paged backing store.
///
/// A request that finds the snapshot stale (or missing) runs a full refresh
/// before being served. Refreshes are single-flight: callers that queue up
/// behind an in-flight refresh receive its outcome instead of scanning again.
/// Readers keep seeing the previous snapshot until the new one is swapped in
/// whole.
pub struct SnapshotCache {
    source: Arc<dyn PageSource>,
    clock: Arc<dyn Clock>,
    refresh_interval: ChronoDuration,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    /// Serializes refreshes and remembers the last outcome for waiters
    refresh_gate: Mutex<RefreshGate>,
    /// Mirrors `RefreshGate::generation` for lock-free reads
    completed_attempts: AtomicU64,
    refresh_count: AtomicU64,
    failed_refresh_count: AtomicU64,
    last_error: parking_lot::RwLock<Option<String>>,
}

#[derive(Default)]
struct RefreshGate {
    generation: u64,
    last_outcome: Option<Result<Arc<Snapshot>, CacheError>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshReason {
    Stale,
    Forced,
}

/// Diagnostic view of the cache; reading it never triggers a refresh
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub item_count: usize,
    pub last_refresh_time: Option<DateTime<Utc>>,
    pub next_refresh_time: Option<DateTime<Utc>>,
    pub seconds_until_next_refresh: i64,
    pub refresh_interval_secs: i64,
    pub refresh_count: u64,
    pub failed_refresh_count: u64,
    pub last_error: Option<String>,
    pub source: String,
}

impl SnapshotCache {
    pub fn new(source: Arc<dyn PageSource>, refresh_interval: std::time::Duration) -> Self {
        Self::with_clock(source, refresh_interval, Arc::new(SystemClock))
    }

    pub fn with_clock(
        source: Arc<dyn PageSource>,
        refresh_interval: std::time::Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let max_interval = std::time::Duration::from_secs(MAX_REFRESH_INTERVAL_SECS);
        if refresh_interval > max_interval {
            logger::warning(
                LogTag::Cache,
                &format!(
                    "Refresh interval of {}s exceeds the maximum, using {}s",
                    refresh_interval.as_secs(),
                    MAX_REFRESH_INTERVAL_SECS
                ),
            );
        }
        let refresh_interval = ChronoDuration::from_std(refresh_interval.min(max_interval))
            .unwrap_or_else(|_| ChronoDuration::seconds(MAX_REFRESH_INTERVAL_SECS as i64));

        Self {
            source,
            clock,
            refresh_interval,
            snapshot: RwLock::new(None),
            refresh_gate: Mutex::new(RefreshGate::default()),
            completed_attempts: AtomicU64::new(0),
            refresh_count: AtomicU64::new(0),
            failed_refresh_count: AtomicU64::new(0),
            last_error: parking_lot::RwLock::new(None),
        }
    }

    /// Current data, refreshing first when the snapshot is stale or missing.
    ///
    /// Blocks for the whole refresh. On failure the previous snapshot stays in
    /// place and the error is returned; the next call tries again.
    pub async fn get_current_data(&self) -> Result<Arc<Snapshot>, CacheError> {
        // Read before checking freshness so a refresh finishing in between is
        // recognised at the gate
        let observed = self.completed_attempts.load(Ordering::SeqCst);

        if let Some(snapshot) = self.fresh_snapshot().await {
            return Ok(snapshot);
        }

        self.refresh_single_flight(observed, RefreshReason::Stale)
            .await
    }

    /// Force a full refresh regardless of freshness (still single-flight)
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CacheError> {
        let observed = self.completed_attempts.load(Ordering::SeqCst);
        self.refresh_single_flight(observed, RefreshReason::Forced)
            .await
    }

    /// Current snapshot without any refresh
    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().await.clone()
    }

    /// Newest timestamp in whatever is cached right now
    pub async fn latest_timestamp(&self) -> LatestTimestamp {
        match self.snapshot().await {
            Some(snapshot) => snapshot.latest_timestamp(),
            None => LatestTimestamp::Undefined,
        }
    }

    pub async fn status(&self) -> CacheStatus {
        let snapshot = self.snapshot().await;
        let now = self.clock.now();

        let last_refresh_time = snapshot.as_ref().map(|s| s.captured_at());
        let next_refresh_time = last_refresh_time.map(|at| at + self.refresh_interval);
        let seconds_until_next_refresh = next_refresh_time
            .map(|next| (next - now).num_seconds().max(0))
            .unwrap_or(0);

        CacheStatus {
            item_count: snapshot.as_ref().map_or(0, |s| s.len()),
            last_refresh_time,
            next_refresh_time,
            seconds_until_next_refresh,
            refresh_interval_secs: self.refresh_interval.num_seconds(),
            refresh_count: self.refresh_count.load(Ordering::SeqCst),
            failed_refresh_count: self.failed_refresh_count.load(Ordering::SeqCst),
            last_error: self.last_error.read().clone(),
            source: self.source.describe(),
        }
    }

    fn is_stale(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> bool {
        now - snapshot.captured_at() > self.refresh_interval
    }

    async fn fresh_snapshot(&self) -> Option<Arc<Snapshot>> {
        let snapshot = self.snapshot().await?;
        if self.is_stale(&snapshot, self.clock.now()) {
            None
        } else {
            Some(snapshot)
        }
    }

    async fn refresh_single_flight(
        &self,
        observed: u64,
        reason: RefreshReason,
    ) -> Result<Arc<Snapshot>, CacheError> {
        let mut gate = self.refresh_gate.lock().await;

        // Another refresh completed while we were queued: share its outcome
        if gate.generation != observed {
            if let Some(outcome) = gate.last_outcome.clone() {
                logger::debug(
                    LogTag::Cache,
                    "Joined result of concurrent refresh instead of scanning again",
                );
                return outcome;
            }
        }

        if reason == RefreshReason::Stale {
            if let Some(snapshot) = self.fresh_snapshot().await {
                return Ok(snapshot);
            }
        }

        let outcome = self.full_refresh(reason).await;

        gate.generation += 1;
        gate.last_outcome = Some(outcome.clone());
        self.completed_attempts
            .store(gate.generation, Ordering::SeqCst);

        outcome
    }

    /// Scan every page, then swap the new snapshot in. Nothing is committed
    /// unless the whole scan succeeds.
    async fn full_refresh(&self, reason: RefreshReason) -> Result<Arc<Snapshot>, CacheError> {
        let started = Instant::now();
        logger::info(
            LogTag::Cache,
            &format!(
                "Starting full refresh from {} ({})",
                self.source.describe(),
                match reason {
                    RefreshReason::Stale => "snapshot stale",
                    RefreshReason::Forced => "forced",
                }
            ),
        );

        let mut records = Vec::new();
        let mut continuation: Option<String> = None;
        let mut pages_fetched = 0usize;

        loop {
            let requested = continuation.clone();
            let page = match self.source.scan_page(continuation.take()).await {
                Ok(page) => page,
                Err(source) => {
                    return Err(self.record_failure(CacheError::RefreshFailed {
                        pages_fetched,
                        source,
                    }));
                }
            };
            pages_fetched += 1;
            records.extend(page.records);

            logger::debug(
                LogTag::Cache,
                &format!(
                    "Page {} fetched ({} records so far)",
                    pages_fetched,
                    records.len()
                ),
            );

            match page.next_token {
                Some(next) if Some(&next) == requested.as_ref() => {
                    return Err(self.record_failure(CacheError::RefreshFailed {
                        pages_fetched,
                        source: crate::errors::StoreError::InvalidToken(format!(
                            "{} (continuation token did not advance)",
                            next
                        )),
                    }));
                }
                Some(next) => continuation = Some(next),
                None => break,
            }
        }

        let snapshot = Arc::new(Snapshot::new(records, self.clock.now()));
        *self.snapshot.write().await = Some(snapshot.clone());

        self.refresh_count.fetch_add(1, Ordering::SeqCst);
        *self.last_error.write() = None;

        logger::info(
            LogTag::Cache,
            &format!(
                "Snapshot refreshed: {} records in {} page(s), took {}ms",
                snapshot.len(),
                pages_fetched,
                started.elapsed().as_millis()
            ),
        );

        Ok(snapshot)
    }

    fn record_failure(&self, error: CacheError) -> CacheError {
        self.failed_refresh_count.fetch_add(1, Ordering::SeqCst);
        *self.last_error.write() = Some(error.to_string());
        logger::error(
            LogTag::Cache,
            &format!("Refresh abandoned, keeping previous snapshot: {}", error),
        );
        error
    }
}
