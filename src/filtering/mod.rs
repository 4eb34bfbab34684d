//! Query filtering over cache snapshots
//!
//! `FilterParams` is the request-boundary validator, `FilterCriteria` the
//! validated value object, and `engine` the ordered stage pipeline.

pub mod engine;
pub mod params;
pub mod types;

pub use engine::{active_stages, apply, apply_to_records, apply_with_stats};
pub use params::FilterParams;
pub use types::{FilterCriteria, FilterStage, FilterStats, DEFAULT_MIN_SOLVE_PERCENTAGE};
