use thiserror::Error;

/// Malformed month, year or date-range selectors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no month or month range was given")]
    EmptyMonths,
    #[error("invalid month input '{0}'")]
    InvalidMonth(String),
    #[error("no year or year range was given")]
    EmptyYears,
    #[error("invalid year '{0}': years must be parseable as integers")]
    InvalidYear(String),
    #[error("invalid year range '{start}-{end}': start year must not be after end year")]
    ReversedYearRange { start: i32, end: i32 },
    #[error("invalid date range: start {start} is after end {end}")]
    ReversedDateRange { start: String, end: String },
}

/// Filter patterns that cannot be compiled.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid filter pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
