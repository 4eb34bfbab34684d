use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::records::GameRecord;

/// Immutable copy of the full dataset produced by one successful refresh
#[derive(Debug, Clone)]
pub struct Snapshot {
    records: Vec<GameRecord>,
    captured_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(records: Vec<GameRecord>, captured_at: DateTime<Utc>) -> Self {
        Self {
            records,
            captured_at,
        }
    }

    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Newest record timestamp, `Undefined` for an empty snapshot
    pub fn latest_timestamp(&self) -> LatestTimestamp {
        self.records
            .iter()
            .map(|record| record.timestamp)
            .max()
            .map_or(LatestTimestamp::Undefined, LatestTimestamp::At)
    }
}

/// Newest cached timestamp; serializes as RFC 3339 or the string "undefined"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatestTimestamp {
    At(DateTime<Utc>),
    Undefined,
}

impl LatestTimestamp {
    pub fn as_option(&self) -> Option<DateTime<Utc>> {
        match self {
            LatestTimestamp::At(ts) => Some(*ts),
            LatestTimestamp::Undefined => None,
        }
    }
}

impl std::fmt::Display for LatestTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LatestTimestamp::At(ts) => f.write_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
            LatestTimestamp::Undefined => f.write_str("undefined"),
        }
    }
}

impl Serialize for LatestTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn record(day: u32) -> GameRecord {
        GameRecord::new(true, "expert", 100.0, 100.0, 50.0, at(day))
    }

    #[test]
    fn test_latest_timestamp_is_max_not_last() {
        let snapshot = Snapshot::new(vec![record(2), record(9), record(5)], at(10));
        assert_eq!(snapshot.latest_timestamp(), LatestTimestamp::At(at(9)));
    }

    #[test]
    fn test_empty_snapshot_is_undefined() {
        let snapshot = Snapshot::new(Vec::new(), at(1));
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.latest_timestamp(), LatestTimestamp::Undefined);
        assert_eq!(snapshot.latest_timestamp().as_option(), None);
    }

    #[test]
    fn test_serialization() {
        assert_eq!(
            serde_json::to_value(LatestTimestamp::Undefined).unwrap(),
            json!("undefined")
        );
        assert_eq!(
            serde_json::to_value(LatestTimestamp::At(at(9))).unwrap(),
            json!("2024-03-09T12:00:00Z")
        );
    }
}
