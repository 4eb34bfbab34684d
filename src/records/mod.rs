//! Game-session records served by the query API

mod types;

pub use types::{derive_solve_percentage, Difficulty, GameRecord};
