//! Month, year and date-range selectors.
//!
//! Selectors come from configuration as short tokens:
//!
//! - months: `"January"`, `"Jan"`, `"January-April"`, `"November-February"`
//!   (ranges wrap forward through December)
//! - years: `"2023"`, `"2022-2024"`
//! - date ranges: `["2024-01-01", "2025-01-01"]`, end exclusive

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// English name of a 1-based month number.
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month.checked_sub(1)?).ok()?;
    MONTHS.get(index).copied()
}

fn parse_month(token: &str) -> Result<u32, ValidationError> {
    let normalized = token.trim().to_ascii_lowercase();
    if normalized.len() >= 3 {
        for (idx, name) in MONTHS.iter().enumerate() {
            let lower = name.to_ascii_lowercase();
            if lower == normalized || (normalized.len() == 3 && lower.starts_with(&normalized)) {
                return Ok(idx as u32 + 1);
            }
        }
    }
    Err(ValidationError::InvalidMonth(token.to_string()))
}

fn expand_month_token(token: &str) -> Result<Vec<u32>, ValidationError> {
    let Some((start, end)) = token.split_once('-') else {
        return Ok(vec![parse_month(token)?]);
    };
    let start = parse_month(start).map_err(|_| ValidationError::InvalidMonth(token.to_string()))?;
    let end = parse_month(end).map_err(|_| ValidationError::InvalidMonth(token.to_string()))?;
    let mut months = Vec::new();
    let mut current = start;
    loop {
        months.push(current);
        if current == end {
            break;
        }
        current = current % 12 + 1;
    }
    Ok(months)
}

/// Expand month tokens into the set of month numbers (1-12) they cover.
pub fn parse_month_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<BTreeSet<u32>, ValidationError> {
    if tokens.is_empty() {
        return Err(ValidationError::EmptyMonths);
    }
    let mut months = BTreeSet::new();
    for token in tokens {
        months.extend(expand_month_token(token.as_ref())?);
    }
    Ok(months)
}

fn parse_year(token: &str) -> Result<i32, ValidationError> {
    let trimmed = token.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(ValidationError::InvalidYear(token.to_string()));
    }
    trimmed
        .parse::<i32>()
        .map_err(|_| ValidationError::InvalidYear(token.to_string()))
}

/// Expand year tokens into the set of years they cover.
pub fn parse_year_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<BTreeSet<i32>, ValidationError> {
    if tokens.is_empty() {
        return Err(ValidationError::EmptyYears);
    }
    let mut years = BTreeSet::new();
    for token in tokens {
        let token = token.as_ref();
        match token.split_once('-') {
            Some((start, end)) => {
                let start = parse_year(start)?;
                let end = parse_year(end)?;
                if start > end {
                    return Err(ValidationError::ReversedYearRange { start, end });
                }
                years.extend(start..=end);
            }
            None => {
                years.insert(parse_year(token)?);
            }
        }
    }
    Ok(years)
}

/// Half-open range of calendar dates, `[start, end)`.
///
/// To select everything through December 2024, the end must be 2025-01-01.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "(NaiveDate, NaiveDate)", into = "(NaiveDate, NaiveDate)")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::ReversedDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Whether the calendar date of `value` falls inside the range.
    pub fn contains(&self, value: NaiveDateTime) -> bool {
        let date = value.date();
        self.start <= date && date < self.end
    }
}

impl TryFrom<(NaiveDate, NaiveDate)> for DateRange {
    type Error = ValidationError;

    fn try_from((start, end): (NaiveDate, NaiveDate)) -> Result<Self, Self::Error> {
        Self::new(start, end)
    }
}

impl From<DateRange> for (NaiveDate, NaiveDate) {
    fn from(range: DateRange) -> Self {
        (range.start, range.end)
    }
}
