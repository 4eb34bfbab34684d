//! Filter pipeline: a fixed, ordered list of pure predicates over records.
//!
//! Every threshold is inclusive and compared as plain f64 (no epsilon). The
//! output keeps the snapshot's order; nothing is re-sorted.

use super::types::{FilterCriteria, FilterStage, FilterStats};
use crate::cache::Snapshot;
use crate::records::GameRecord;

impl FilterStage {
    /// Whether this stage takes part in a query with these criteria
    pub fn is_active(&self, criteria: &FilterCriteria) -> bool {
        match self {
            FilterStage::SolvedOnly => criteria.solved_only,
            FilterStage::Difficulty => true,
            FilterStage::MinBoard3bv => true,
            FilterStage::MinEfficiency => true,
            // Solved games are 100% by definition, so the floor only matters
            // when unsolved games are included
            FilterStage::MinSolvePercentage => !criteria.solved_only,
            FilterStage::Earliest => criteria.earliest.is_some(),
            FilterStage::Latest => criteria.latest.is_some(),
        }
    }

    /// The stage predicate. Inactive stages accept everything.
    pub fn matches(&self, record: &GameRecord, criteria: &FilterCriteria) -> bool {
        match self {
            FilterStage::SolvedOnly => !criteria.solved_only || record.solved,
            FilterStage::Difficulty => criteria.difficulty.matches(&record.difficulty),
            FilterStage::MinBoard3bv => record.board_3bv >= criteria.min_3bv,
            FilterStage::MinEfficiency => record.efficiency >= criteria.min_efficiency,
            FilterStage::MinSolvePercentage => {
                criteria.solved_only || record.solve_percentage >= criteria.min_solve_percentage
            }
            FilterStage::Earliest => criteria
                .earliest
                .map_or(true, |earliest| record.timestamp >= earliest),
            FilterStage::Latest => criteria
                .latest
                .map_or(true, |latest| record.timestamp <= latest),
        }
    }
}

/// Stages that apply to `criteria`, in evaluation order
pub fn active_stages(criteria: &FilterCriteria) -> Vec<FilterStage> {
    FilterStage::ORDER
        .iter()
        .copied()
        .filter(|stage| stage.is_active(criteria))
        .collect()
}

/// Does `record` pass every active stage?
pub fn matches_all(record: &GameRecord, stages: &[FilterStage], criteria: &FilterCriteria) -> bool {
    stages.iter().all(|stage| stage.matches(record, criteria))
}

/// Records of `snapshot` that pass every stage, in snapshot order
pub fn apply(snapshot: &Snapshot, criteria: &FilterCriteria) -> Vec<GameRecord> {
    apply_to_records(snapshot.records(), criteria)
}

pub fn apply_to_records(records: &[GameRecord], criteria: &FilterCriteria) -> Vec<GameRecord> {
    let stages = active_stages(criteria);
    records
        .iter()
        .filter(|record| matches_all(record, &stages, criteria))
        .cloned()
        .collect()
}

/// Same result as [`apply`], narrowing stage by stage to count rejections
pub fn apply_with_stats(
    snapshot: &Snapshot,
    criteria: &FilterCriteria,
) -> (Vec<GameRecord>, FilterStats) {
    let mut stats = FilterStats {
        total_processed: snapshot.len(),
        ..FilterStats::default()
    };

    let mut remaining: Vec<&GameRecord> = snapshot.records().iter().collect();
    for stage in active_stages(criteria) {
        let before = remaining.len();
        remaining.retain(|record| stage.matches(record, criteria));
        stats.record_rejections(stage, before - remaining.len());
    }

    stats.passed = remaining.len();
    (remaining.into_iter().cloned().collect(), stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Difficulty;
    use chrono::{DateTime, TimeZone, Utc};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, d, 12, 0, 0).unwrap()
    }

    fn game(solved: bool, difficulty: &str, board_3bv: f64, efficiency: f64, d: u32) -> GameRecord {
        let completed = if solved { board_3bv } else { board_3bv / 2.0 };
        GameRecord::new(solved, difficulty, board_3bv, completed, efficiency, day(d))
    }

    fn snapshot(records: Vec<GameRecord>) -> Snapshot {
        Snapshot::new(records, day(30))
    }

    fn mixed() -> Snapshot {
        snapshot(vec![
            game(true, "expert", 150.0, 80.0, 1),
            game(false, "expert", 120.0, 40.0, 2),
            game(true, "beginner", 10.0, 100.0, 3),
            game(true, "Expert", 99.0, 55.0, 4),
            game(false, "intermediate", 60.0, 70.0, 5),
            game(true, "expert", 200.0, 20.0, 6),
            game(false, "EXPERT", 180.0, 90.0, 7),
        ])
    }

    fn is_subsequence(result: &[GameRecord], source: &[GameRecord]) -> bool {
        let mut it = source.iter();
        result.iter().all(|r| it.any(|s| s == r))
    }

    #[test]
    fn test_scenario_defaults_keep_solved_expert_only() {
        let snap = snapshot(vec![
            game(true, "expert", 100.0, 50.0, 1),
            game(false, "expert", 100.0, 50.0, 2),
        ]);

        let result = apply(&snap, &FilterCriteria::default());
        assert_eq!(result, vec![snap.records()[0].clone()]);
    }

    #[test]
    fn test_scenario_unsolved_included_with_zero_floor() {
        let snap = snapshot(vec![
            game(true, "expert", 100.0, 50.0, 1),
            game(false, "expert", 100.0, 50.0, 2),
        ]);
        let criteria = FilterCriteria {
            solved_only: false,
            min_solve_percentage: 0.0,
            ..FilterCriteria::default()
        };

        let result = apply(&snap, &criteria);
        assert_eq!(result.len(), 2);
        assert_eq!(result[1].solve_percentage, 50.0);
    }

    #[test]
    fn test_result_is_ordered_subsequence() {
        let snap = mixed();
        let criteria_set = [
            FilterCriteria::default(),
            FilterCriteria {
                solved_only: false,
                min_solve_percentage: 0.0,
                ..FilterCriteria::default()
            },
            FilterCriteria {
                difficulty: Difficulty::Beginner,
                ..FilterCriteria::default()
            },
            FilterCriteria {
                min_3bv: 100.0,
                min_efficiency: 50.0,
                ..FilterCriteria::default()
            },
        ];

        for criteria in &criteria_set {
            let result = apply(&snap, criteria);
            assert!(is_subsequence(&result, snap.records()), "{:?}", criteria);
        }
    }

    #[test]
    fn test_apply_is_idempotent() {
        let snap = mixed();
        let criteria = FilterCriteria {
            solved_only: false,
            min_solve_percentage: 10.0,
            min_3bv: 50.0,
            ..FilterCriteria::default()
        };
        assert_eq!(apply(&snap, &criteria), apply(&snap, &criteria));
    }

    #[test]
    fn test_min_3bv_boundary_is_inclusive() {
        let snap = snapshot(vec![
            game(true, "expert", 100.0, 50.0, 1),
            game(true, "expert", 99.999, 50.0, 2),
        ]);
        let criteria = FilterCriteria {
            min_3bv: 100.0,
            ..FilterCriteria::default()
        };

        let result = apply(&snap, &criteria);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].board_3bv, 100.0);
    }

    #[test]
    fn test_min_efficiency_boundary_is_inclusive() {
        let snap = snapshot(vec![
            game(true, "expert", 100.0, 75.0, 1),
            game(true, "expert", 100.0, 74.9, 2),
        ]);
        let criteria = FilterCriteria {
            min_efficiency: 75.0,
            ..FilterCriteria::default()
        };
        assert_eq!(apply(&snap, &criteria).len(), 1);
    }

    #[test]
    fn test_solved_only_never_applies_percentage_floor() {
        let odd = game(true, "expert", 100.0, 50.0, 1).with_solve_percentage(0.0);
        let snap = snapshot(vec![odd.clone()]);
        let criteria = FilterCriteria {
            solved_only: true,
            min_solve_percentage: 99.0,
            ..FilterCriteria::default()
        };

        assert_eq!(apply(&snap, &criteria), vec![odd]);
        assert!(!active_stages(&criteria).contains(&FilterStage::MinSolvePercentage));
    }

    #[test]
    fn test_percentage_floor_applies_when_unsolved_included() {
        let snap = snapshot(vec![
            game(false, "expert", 100.0, 50.0, 1).with_solve_percentage(49.9),
            game(false, "expert", 100.0, 50.0, 2).with_solve_percentage(50.0),
            game(true, "expert", 100.0, 50.0, 3),
        ]);
        let criteria = FilterCriteria {
            solved_only: false,
            ..FilterCriteria::default()
        };

        let result = apply(&snap, &criteria);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].timestamp, day(2));
        assert_eq!(result[1].timestamp, day(3));
    }

    #[test]
    fn test_difficulty_match_ignores_case() {
        let result = apply(&mixed(), &FilterCriteria::default());
        let days: Vec<DateTime<Utc>> = result.iter().map(|r| r.timestamp).collect();
        assert_eq!(days, vec![day(1), day(4), day(6)]);
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let criteria = FilterCriteria {
            solved_only: false,
            min_solve_percentage: 0.0,
            earliest: Some(day(2)),
            latest: Some(day(6)),
            ..FilterCriteria::default()
        };

        let result = apply(&mixed(), &criteria);
        let days: Vec<DateTime<Utc>> = result.iter().map(|r| r.timestamp).collect();
        assert_eq!(days, vec![day(2), day(4), day(6)]);
    }

    #[test]
    fn test_inverted_date_bounds_match_nothing() {
        let criteria = FilterCriteria {
            earliest: Some(day(6)),
            latest: Some(day(2)),
            ..FilterCriteria::default()
        };
        assert!(apply(&mixed(), &criteria).is_empty());
    }

    #[test]
    fn test_nan_fields_never_pass_thresholds() {
        let snap = snapshot(vec![game(true, "expert", f64::NAN, 50.0, 1)]);
        assert!(apply(&snap, &FilterCriteria::default()).is_empty());
    }

    #[test]
    fn test_stats_agree_with_apply() {
        let snap = mixed();
        let criteria = FilterCriteria {
            solved_only: false,
            min_solve_percentage: 60.0,
            min_3bv: 100.0,
            ..FilterCriteria::default()
        };

        let (result, stats) = apply_with_stats(&snap, &criteria);
        assert_eq!(result, apply(&snap, &criteria));
        assert_eq!(stats.total_processed, 7);
        assert_eq!(stats.passed, result.len());
        assert_eq!(stats.passed + stats.rejected(), 7);

        // Stage order decides which stage gets charged for a rejection
        assert_eq!(stats.rejection_counts.get(&FilterStage::SolvedOnly), None);
        assert_eq!(stats.rejection_counts.get(&FilterStage::Difficulty), Some(&2));
        assert_eq!(stats.rejection_counts.get(&FilterStage::MinBoard3bv), Some(&1));
        assert_eq!(
            stats.rejection_counts.get(&FilterStage::MinSolvePercentage),
            Some(&2)
        );
        assert_eq!(
            stats.rejection_summary(),
            "difficulty:2,min_3bv:1,min_solve_percentage:2"
        );
    }

    #[test]
    fn test_active_stages_follow_fixed_order() {
        let criteria = FilterCriteria {
            solved_only: false,
            earliest: Some(day(1)),
            latest: Some(day(2)),
            ..FilterCriteria::default()
        };
        assert_eq!(
            active_stages(&criteria),
            vec![
                FilterStage::Difficulty,
                FilterStage::MinBoard3bv,
                FilterStage::MinEfficiency,
                FilterStage::MinSolvePercentage,
                FilterStage::Earliest,
                FilterStage::Latest,
            ]
        );
        assert_eq!(active_stages(&FilterCriteria::default()).len(), 4);
    }
}
