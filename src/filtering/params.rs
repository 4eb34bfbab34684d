use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::types::FilterCriteria;
use crate::errors::ValidationError;
use crate::records::Difficulty;

/// Raw `/data` query string. Every field is optional and still unparsed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    pub solved: Option<String>,
    pub difficulty: Option<String>,
    #[serde(rename = "3bv_threshold")]
    pub board_3bv_threshold: Option<String>,
    pub efficiency_threshold: Option<String>,
    pub solved_percent_threshold: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl FilterParams {
    /// Validate every present parameter; absent ones take the criteria defaults.
    pub fn into_criteria(self) -> Result<FilterCriteria, ValidationError> {
        let defaults = FilterCriteria::default();

        let solved_only = match self.solved {
            Some(value) => parse_flag(&value)?,
            None => defaults.solved_only,
        };

        let difficulty = match self.difficulty {
            Some(value) => value
                .trim()
                .parse::<Difficulty>()
                .map_err(|value| ValidationError::InvalidDifficulty { value })?,
            None => defaults.difficulty,
        };

        Ok(FilterCriteria {
            solved_only,
            difficulty,
            min_3bv: parse_threshold("3bv_threshold", self.board_3bv_threshold)?
                .unwrap_or(defaults.min_3bv),
            min_efficiency: parse_threshold("efficiency_threshold", self.efficiency_threshold)?
                .unwrap_or(defaults.min_efficiency),
            min_solve_percentage: parse_threshold(
                "solved_percent_threshold",
                self.solved_percent_threshold,
            )?
            .unwrap_or(defaults.min_solve_percentage),
            earliest: parse_date("start_date", self.start_date)?,
            latest: parse_date("end_date", self.end_date)?,
        })
    }
}

fn parse_flag(value: &str) -> Result<bool, ValidationError> {
    match value.trim().to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ValidationError::InvalidSolvedFlag {
            value: value.to_string(),
        }),
    }
}

fn parse_threshold(
    param: &'static str,
    value: Option<String>,
) -> Result<Option<f64>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };

    match value.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(Some(number)),
        _ => Err(ValidationError::InvalidNumber { param, value }),
    }
}

/// `YYYY-MM-DD`, read as midnight UTC
fn parse_date(
    param: &'static str,
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let trimmed = value.trim();
    if !is_iso_date_shape(trimmed) {
        return Err(ValidationError::InvalidDate { param, value });
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Some(midnight.and_utc()))
        .ok_or(ValidationError::InvalidDate { param, value })
}

/// Exactly `YYYY-MM-DD`: chrono alone accepts unpadded fields like `2024-1-1`
fn is_iso_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
