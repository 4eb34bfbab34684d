//! Snapshot cache: full-refresh, read-through cache with a wall-clock TTL

mod clock;
mod snapshot;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use snapshot::{LatestTimestamp, Snapshot};
pub use store::{
    CacheStatus, SnapshotCache, DEFAULT_REFRESH_INTERVAL_SECS, MAX_REFRESH_INTERVAL_SECS,
};
