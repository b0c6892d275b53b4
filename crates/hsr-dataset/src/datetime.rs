//! Date/time parsing for exported date columns.
//!
//! Exports disagree on how they write dates. The scheduling platform writes
//! `MM/DD/YYYY hh:mm AM`, spreadsheets round-trip ISO text, and the survey
//! export carries whatever a browser's `Date.toString()` produced. All of them
//! are reduced to timezone-naive wall-clock time.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// JavaScript `Date.prototype.toString()` without the zone suffix.
const JS_DATE_FORMAT: &str = "%a %b %d %Y %H:%M:%S";

/// Parses a date or date-time cell.
///
/// Offsets are dropped and the local wall-clock time is kept. Returns `None`
/// for blank or unrecognized text.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_local());
    }
    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(trimmed, format) {
            return Some(parsed.naive_local());
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(parsed.and_time(NaiveTime::MIN));
        }
    }
    if let Some((prefix, _zone)) = trimmed.split_once(" GMT") {
        return NaiveDateTime::parse_from_str(prefix.trim(), JS_DATE_FORMAT).ok();
    }
    NaiveDateTime::parse_from_str(trimmed, JS_DATE_FORMAT).ok()
}

/// Microseconds since the epoch for a naive date-time.
pub fn to_epoch_micros(value: NaiveDateTime) -> i64 {
    value.and_utc().timestamp_micros()
}

/// Inverse of [`to_epoch_micros`].
pub fn from_epoch_micros(micros: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_micros(micros).map(|value| value.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn micros_round_trip() {
        let value = at(2024, 2, 29, 13, 45, 10);
        assert_eq!(from_epoch_micros(to_epoch_micros(value)), Some(value));
    }

    #[test]
    fn blank_is_none() {
        assert_eq!(parse_datetime("   "), None);
    }
}
