/// Local CSV export used as a table store
///
/// Expected headers (extra columns are passed through):
///   Board Solved, Difficulty, 3BV, Completed 3BV, Efficiency[, Timestamp]
///
/// Exports without a Timestamp column stamp every row with the file's
/// modification time.
///
/// The file is parsed once per scan (on the first page) and then served in
/// `page_size` slices; the continuation token is the next row offset.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use parking_lot::Mutex;
use serde_json::{Map, Value};

use super::{Page, PageSource};
use crate::errors::StoreError;
use crate::logger::{self, LogTag};
use crate::records::{derive_solve_percentage, GameRecord};

const COL_SOLVED: &str = "Board Solved";
const COL_DIFFICULTY: &str = "Difficulty";
const COL_BOARD_3BV: &str = "3BV";
const COL_COMPLETED_3BV: &str = "Completed 3BV";
const COL_EFFICIENCY: &str = "Efficiency";
const COL_TIMESTAMP: &str = "Timestamp";

pub struct CsvFileSource {
    path: PathBuf,
    page_size: usize,
    /// Rows parsed by the current scan
    loaded: Mutex<Option<Arc<Vec<GameRecord>>>>,
}

impl CsvFileSource {
    pub fn new(path: impl AsRef<Path>, page_size: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            page_size: page_size.max(1),
            loaded: Mutex::new(None),
        }
    }

    /// Use the first `*.csv` file (alphabetically) found in `dir`
    pub fn discover(dir: &str, page_size: usize) -> Result<Self, StoreError> {
        let pattern = Path::new(&glob::Pattern::escape(dir)).join("*.csv");
        let pattern = pattern.to_string_lossy();

        let mut candidates: Vec<PathBuf> = glob::glob(&pattern)
            .map_err(|e| StoreError::Io(format!("bad search pattern '{}': {}", pattern, e)))?
            .filter_map(Result::ok)
            .collect();
        candidates.sort();

        let path = candidates
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Io(format!("no CSV data store found in '{}'", dir)))?;

        logger::info(
            LogTag::Store,
            &format!("Found and using CSV file {} as data store", path.display()),
        );
        Ok(Self::new(path, page_size))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Arc<Vec<GameRecord>>, StoreError> {
        let contents = tokio::fs::read(&self.path).await.map_err(|e| {
            StoreError::Io(format!("failed to read '{}': {}", self.path.display(), e))
        })?;
        let modified = tokio::fs::metadata(&self.path)
            .await
            .and_then(|meta| meta.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        let records = Arc::new(parse_csv(&contents, modified)?);
        logger::debug(
            LogTag::Store,
            &format!("Parsed {} row(s) from {}", records.len(), self.path.display()),
        );
        *self.loaded.lock() = Some(records.clone());
        Ok(records)
    }
}

#[async_trait]
impl PageSource for CsvFileSource {
    fn describe(&self) -> String {
        format!("csv file {}", self.path.display())
    }

    async fn scan_page(&self, continuation: Option<String>) -> Result<Page, StoreError> {
        let offset = match &continuation {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| StoreError::InvalidToken(token.clone()))?,
        };

        // A fresh scan always re-reads the file so edits are picked up
        let cached = if continuation.is_none() {
            None
        } else {
            self.loaded.lock().clone()
        };
        let records = match cached {
            Some(records) => records,
            None => self.load().await?,
        };

        if offset > records.len() {
            return Err(StoreError::InvalidToken(offset.to_string()));
        }

        let end = (offset + self.page_size).min(records.len());
        let next_token = (end < records.len()).then(|| end.to_string());
        if next_token.is_none() {
            *self.loaded.lock() = None;
        }

        Ok(Page {
            records: records[offset..end].to_vec(),
            next_token,
        })
    }
}

/// Parse a whole CSV export into records
pub(crate) fn parse_csv(
    bytes: &[u8],
    default_timestamp: DateTime<Utc>,
) -> Result<Vec<GameRecord>, StoreError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(bytes);
    let headers = reader.headers()?.clone();

    let index_of = |name: &str| -> Result<usize, StoreError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| StoreError::Decode(format!("missing CSV column '{}'", name)))
    };
    let solved_idx = index_of(COL_SOLVED)?;
    let difficulty_idx = index_of(COL_DIFFICULTY)?;
    let board_idx = index_of(COL_BOARD_3BV)?;
    let completed_idx = index_of(COL_COMPLETED_3BV)?;
    let efficiency_idx = index_of(COL_EFFICIENCY)?;
    let timestamp_idx = index_of(COL_TIMESTAMP).ok();
    let known = [
        Some(solved_idx),
        Some(difficulty_idx),
        Some(board_idx),
        Some(completed_idx),
        Some(efficiency_idx),
        timestamp_idx,
    ];

    let mut records = Vec::new();
    for (row_number, row) in reader.records().enumerate() {
        let row = row?;
        // Header is line 1
        let line = row_number + 2;
        let field = |idx: usize| row.get(idx).unwrap_or("");

        let board_3bv = parse_number(field(board_idx), COL_BOARD_3BV, line)?;
        let completed_3bv = parse_number(field(completed_idx), COL_COMPLETED_3BV, line)?;

        let mut extra = Map::new();
        for (idx, header) in headers.iter().enumerate() {
            if !known.contains(&Some(idx)) {
                extra.insert(header.to_string(), infer_value(field(idx)));
            }
        }

        records.push(GameRecord {
            solved: parse_bool(field(solved_idx), line)?,
            difficulty: field(difficulty_idx).to_string(),
            board_3bv,
            completed_3bv,
            efficiency: parse_number(field(efficiency_idx), COL_EFFICIENCY, line)?,
            solve_percentage: derive_solve_percentage(completed_3bv, board_3bv),
            timestamp: match timestamp_idx {
                Some(idx) => parse_timestamp(field(idx), line)?,
                None => default_timestamp,
            },
            extra,
        });
    }

    Ok(records)
}

fn parse_bool(value: &str, line: usize) -> Result<bool, StoreError> {
    match value.to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(StoreError::Decode(format!(
            "line {}: '{}' is not a boolean in column '{}'",
            line, value, COL_SOLVED
        ))),
    }
}

fn parse_number(value: &str, column: &str, line: usize) -> Result<f64, StoreError> {
    value.parse::<f64>().map_err(|_| {
        StoreError::Decode(format!(
            "line {}: '{}' is not a number in column '{}'",
            line, value, column
        ))
    })
}

/// RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]` (UTC) or a bare date (UTC midnight)
fn parse_timestamp(value: &str, line: usize) -> Result<DateTime<Utc>, StoreError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(StoreError::Decode(format!(
        "line {}: '{}' is not a timestamp in column '{}'",
        line, value, COL_TIMESTAMP
    )))
}

/// Pass-through columns keep numbers and booleans typed in the JSON output
fn infer_value(value: &str) -> Value {
    if value.is_empty() {
        return Value::Null;
    }
    if let Ok(n) = value.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = value.parse::<f64>() {
        if f.is_finite() {
            return Value::from(f);
        }
    }
    match value.to_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::io::Write;

    const SAMPLE: &str = "\
Board Solved,Difficulty,3BV,Completed 3BV,Efficiency,Timestamp,Time
True,expert,150,150,88.5,2024-02-01 10:00:00,95
False,Expert,200,50,40,2024-02-02T11:30:00Z,30.5
True,beginner,20,20,100,2024-02-03,4
";

    fn write_sample(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_original_export_layout() {
        let records = parse_csv(SAMPLE.as_bytes(), Utc::now()).unwrap();
        assert_eq!(records.len(), 3);

        assert!(records[0].solved);
        assert_eq!(records[0].board_3bv, 150.0);
        assert_eq!(records[0].solve_percentage, 100.0);
        assert_eq!(
            records[0].timestamp,
            Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap()
        );
        assert_eq!(records[0].extra.get("Time"), Some(&json!(95)));

        assert!(!records[1].solved);
        assert_eq!(records[1].difficulty, "Expert");
        assert_eq!(records[1].solve_percentage, 25.0);
        assert_eq!(records[1].extra.get("Time"), Some(&json!(30.5)));

        assert_eq!(
            records[2].timestamp,
            Utc.with_ymd_and_hms(2024, 2, 3, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_missing_column_is_decode_error() {
        let err = parse_csv(b"Board Solved,Difficulty\nTrue,expert\n", Utc::now()).unwrap_err();
        assert!(matches!(err, StoreError::Decode(msg) if msg.contains("3BV")));
    }

    #[test]
    fn test_bad_number_reports_line() {
        let bad = "Board Solved,Difficulty,3BV,Completed 3BV,Efficiency,Timestamp\n\
                   True,expert,abc,1,1,2024-01-01\n";
        let err = parse_csv(bad.as_bytes(), Utc::now()).unwrap_err();
        assert!(matches!(err, StoreError::Decode(msg) if msg.contains("line 2")));
    }

    #[test]
    fn test_export_without_timestamps_uses_default() {
        let export = "Board Solved,Difficulty,3BV,Completed 3BV,Efficiency\n\
                      False,expert,120,30,55\n";
        let stamp = Utc.with_ymd_and_hms(2023, 11, 5, 18, 0, 0).unwrap();

        let records = parse_csv(export.as_bytes(), stamp).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].timestamp, stamp);
        assert_eq!(records[0].solve_percentage, 25.0);
        assert!(records[0].extra.is_empty());
    }

    #[tokio::test]
    async fn test_serves_rows_in_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, "games.csv");
        let source = CsvFileSource::new(&path, 2);

        let first = source.scan_page(None).await.unwrap();
        assert_eq!(first.records.len(), 2);
        assert_eq!(first.next_token.as_deref(), Some("2"));

        assert!(source.loaded.lock().is_some());

        let second = source.scan_page(first.next_token).await.unwrap();
        assert_eq!(second.records.len(), 1);
        assert!(second.next_token.is_none());
        assert!(source.loaded.lock().is_none());

        assert!(matches!(
            source.scan_page(Some("x".to_string())).await,
            Err(StoreError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let source = CsvFileSource::new("/definitely/not/here.csv", 10);
        assert!(matches!(
            source.scan_page(None).await,
            Err(StoreError::Io(_))
        ));
    }

    #[test]
    fn test_discover_picks_first_csv() {
        let dir = tempfile::tempdir().unwrap();
        write_sample(&dir, "b_games.csv");
        write_sample(&dir, "a_games.csv");
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let source = CsvFileSource::discover(dir.path().to_str().unwrap(), 10).unwrap();
        assert!(source.path().ends_with("a_games.csv"));
    }

    #[test]
    fn test_discover_escapes_directory_name() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("data[1]");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("games.csv"), SAMPLE).unwrap();

        let source = CsvFileSource::discover(dir.to_str().unwrap(), 10).unwrap();
        assert!(source.path().ends_with("games.csv"));
    }

    #[test]
    fn test_discover_without_csv_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CsvFileSource::discover(dir.path().to_str().unwrap(), 10).is_err());
    }
}
