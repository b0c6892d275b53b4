//! Polars AnyValue utility functions.
//!
//! This module provides helper functions for working with Polars `AnyValue` types,
//! including string conversions used when matching cells and writing CSV.

use chrono::DateTime;
use polars::prelude::{AnyValue, Column, TimeUnit};

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

/// Converts a Polars AnyValue to a String representation.
/// Returns empty string for Null, properly formats numeric and temporal types.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => if b { "TRUE" } else { "FALSE" }.to_string(),
        AnyValue::Datetime(v, unit, _) => format_datetime_micros(to_micros(v, unit)),
        AnyValue::Duration(v, unit) => format_duration_micros(to_micros(v, unit)),
        other => other.to_string(),
    }
}

/// Converts AnyValue to String, returning None for nulls and blank text.
pub fn any_to_string_non_empty(value: AnyValue<'_>) -> Option<String> {
    let s = any_to_string(value);
    if s.trim().is_empty() { None } else { Some(s) }
}

/// All cells of a column as optional strings.
pub fn column_strings(column: &Column) -> Vec<Option<String>> {
    (0..column.len())
        .map(|idx| any_to_string_non_empty(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect()
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Normalizes a temporal value to microseconds.
pub fn to_micros(value: i64, unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Nanoseconds => value / 1_000,
        TimeUnit::Microseconds => value,
        TimeUnit::Milliseconds => value * 1_000,
    }
}

/// Formats microseconds since the epoch as `YYYY-MM-DD HH:MM:SS`.
pub fn format_datetime_micros(micros: i64) -> String {
    DateTime::from_timestamp_micros(micros)
        .map(|value| value.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Formats a duration in microseconds as `N days HH:MM:SS`.
pub fn format_duration_micros(micros: i64) -> String {
    let days = micros.div_euclid(MICROS_PER_DAY);
    let seconds = micros.rem_euclid(MICROS_PER_DAY) / MICROS_PER_SECOND;
    format!(
        "{days} days {:02}:{:02}:{:02}",
        seconds / 3_600,
        (seconds % 3_600) / 60,
        seconds % 60
    )
}
