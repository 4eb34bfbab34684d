use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::records::Difficulty;

/// Default solve-percentage floor for queries that include unsolved games
pub const DEFAULT_MIN_SOLVE_PERCENTAGE: f64 = 50.0;

/// Validated filter values for one query.
///
/// Built by [`super::FilterParams::into_criteria`] at the request boundary;
/// the pipeline trusts every value in here.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub solved_only: bool,
    pub difficulty: Difficulty,
    pub min_3bv: f64,
    pub min_efficiency: f64,
    /// Only applied when `solved_only` is false
    pub min_solve_percentage: f64,
    /// Inclusive lower bound on `timestamp`
    pub earliest: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `timestamp`
    pub latest: Option<DateTime<Utc>>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            solved_only: true,
            difficulty: Difficulty::Expert,
            min_3bv: 0.0,
            min_efficiency: 0.0,
            min_solve_percentage: DEFAULT_MIN_SOLVE_PERCENTAGE,
            earliest: None,
            latest: None,
        }
    }
}

/// The fixed pipeline stages, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterStage {
    SolvedOnly,
    Difficulty,
    MinBoard3bv,
    MinEfficiency,
    MinSolvePercentage,
    Earliest,
    Latest,
}

impl FilterStage {
    pub const ORDER: [FilterStage; 7] = [
        FilterStage::SolvedOnly,
        FilterStage::Difficulty,
        FilterStage::MinBoard3bv,
        FilterStage::MinEfficiency,
        FilterStage::MinSolvePercentage,
        FilterStage::Earliest,
        FilterStage::Latest,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FilterStage::SolvedOnly => "solved_only",
            FilterStage::Difficulty => "difficulty",
            FilterStage::MinBoard3bv => "min_3bv",
            FilterStage::MinEfficiency => "min_efficiency",
            FilterStage::MinSolvePercentage => "min_solve_percentage",
            FilterStage::Earliest => "earliest",
            FilterStage::Latest => "latest",
        }
    }
}

/// Per-stage rejection counts from one pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterStats {
    pub total_processed: usize,
    pub passed: usize,
    pub rejection_counts: HashMap<FilterStage, usize>,
}

impl FilterStats {
    pub fn record_rejections(&mut self, stage: FilterStage, count: usize) {
        if count > 0 {
            *self.rejection_counts.entry(stage).or_insert(0) += count;
        }
    }

    pub fn rejected(&self) -> usize {
        self.rejection_counts.values().sum()
    }

    /// `stage:count` pairs in pipeline order, `-` when nothing was rejected
    pub fn rejection_summary(&self) -> String {
        let parts: Vec<String> = FilterStage::ORDER
            .iter()
            .filter_map(|stage| {
                self.rejection_counts
                    .get(stage)
                    .map(|count| format!("{}:{}", stage.label(), count))
            })
            .collect();

        if parts.is_empty() {
            "-".to_string()
        } else {
            parts.join(",")
        }
    }
}
