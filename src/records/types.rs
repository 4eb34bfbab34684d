use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Board difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Expert => "expert",
        }
    }

    /// Case-insensitive match against a stored difficulty label
    pub fn matches(&self, label: &str) -> bool {
        label.to_lowercase() == self.as_str()
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Expert
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "expert" => Ok(Difficulty::Expert),
            _ => Err(value.to_string()),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finished or abandoned game.
///
/// `difficulty` keeps the label exactly as stored; comparisons lower-case it.
/// `solve_percentage` is materialized when the record is decoded and never
/// recomputed afterwards. Attributes the store returns beyond the known ones
/// are kept in `extra` and serialized back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawGameRecord")]
pub struct GameRecord {
    pub solved: bool,
    pub difficulty: String,
    pub board_3bv: f64,
    pub completed_3bv: f64,
    pub efficiency: f64,
    pub solve_percentage: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GameRecord {
    /// Build a record, deriving `solve_percentage` from the 3bv counts
    pub fn new(
        solved: bool,
        difficulty: impl Into<String>,
        board_3bv: f64,
        completed_3bv: f64,
        efficiency: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            solved,
            difficulty: difficulty.into(),
            board_3bv,
            completed_3bv,
            efficiency,
            solve_percentage: derive_solve_percentage(completed_3bv, board_3bv),
            timestamp,
            extra: Map::new(),
        }
    }

    /// Override the stored percentage (stores that precompute it)
    pub fn with_solve_percentage(mut self, solve_percentage: f64) -> Self {
        self.solve_percentage = solve_percentage;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// `completed / board * 100`, or 0 for an empty board
pub fn derive_solve_percentage(completed_3bv: f64, board_3bv: f64) -> f64 {
    if board_3bv > 0.0 {
        completed_3bv / board_3bv * 100.0
    } else {
        0.0
    }
}

/// Wire shape: `solve_percentage` may be missing and is then derived.
#[derive(Deserialize)]
struct RawGameRecord {
    solved: bool,
    difficulty: String,
    board_3bv: f64,
    completed_3bv: f64,
    efficiency: f64,
    #[serde(default)]
    solve_percentage: Option<f64>,
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawGameRecord> for GameRecord {
    fn from(raw: RawGameRecord) -> Self {
        let solve_percentage = raw
            .solve_percentage
            .unwrap_or_else(|| derive_solve_percentage(raw.completed_3bv, raw.board_3bv));

        Self {
            solved: raw.solved,
            difficulty: raw.difficulty,
            board_3bv: raw.board_3bv,
            completed_3bv: raw.completed_3bv,
            efficiency: raw.efficiency,
            solve_percentage,
            timestamp: raw.timestamp,
            extra: raw.extra,
        }
    }
}
