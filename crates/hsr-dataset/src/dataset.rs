//! Typed dataset wrapper.
//!
//! A [`Dataset`] couples a loaded table with the logical-column mapping from
//! configuration. The kind parameter fixes which logical columns may be
//! mapped, and every lookup distinguishes a column that is not configured
//! (`Ok(None)`) from one that is configured but missing from the table (an
//! error).

use std::marker::PhantomData;

use chrono::{Datelike, NaiveDateTime};
use hsr_ingest::{column_strings, to_micros};
use hsr_model::{
    AppointmentStatus, Appointments, Column, ColumnMap, DateRange, DatasetKind, FilterSpec,
    KindName, Referrals, parse_month_tokens, parse_year_tokens,
};
use polars::prelude::{
    BooleanChunked, Column as FrameColumn, DataFrame, DataType, IntoLazy, NamedFrom,
    NewChunkedArray, Series, SortMultipleOptions, TimeUnit, col,
};
use tracing::{debug, warn};

use crate::datetime::{from_epoch_micros, parse_datetime, to_epoch_micros};
use crate::error::{DatasetError, Result};

/// A loaded export viewed through its logical columns.
#[derive(Debug, Clone)]
pub struct Dataset<K: DatasetKind> {
    id: String,
    data: DataFrame,
    columns: ColumnMap,
    kind: PhantomData<K>,
}

impl<K: DatasetKind> Dataset<K> {
    /// Wraps `data`, rejecting mappings for columns the kind does not declare.
    pub fn new(id: impl Into<String>, data: DataFrame, columns: ColumnMap) -> Result<Self> {
        if let Some(column) = columns.keys().copied().find(|column| !K::declares(*column)) {
            return Err(DatasetError::UndeclaredColumn {
                kind: K::NAME,
                column,
            });
        }
        Ok(Self {
            id: id.into(),
            data,
            columns,
            kind: PhantomData,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> KindName {
        K::NAME
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn into_data(self) -> DataFrame {
        self.data
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.data.height()
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Replaces the table, keeping the column mapping.
    pub fn set_data(&mut self, data: DataFrame) {
        self.data = data;
    }

    /// Independent copy for a single report run.
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    /// Header configured for `column`.
    pub fn get_column_name(&self, column: Column) -> Result<Option<&str>> {
        if !K::declares(column) {
            return Err(DatasetError::UndeclaredColumn {
                kind: K::NAME,
                column,
            });
        }
        Ok(self.columns.get(&column).map(String::as_str))
    }

    /// Header configured for `column`, treating "not configured" as an error.
    pub fn require_column_name(&self, column: Column) -> Result<&str> {
        self.get_column_name(column)?
            .ok_or_else(|| DatasetError::UnconfiguredColumn {
                dataset: self.id.clone(),
                column,
            })
    }

    /// Table column for `column`, or `None` when it is not configured.
    pub fn get_column(&self, column: Column) -> Result<Option<&FrameColumn>> {
        let Some(header) = self.get_column_name(column)? else {
            return Ok(None);
        };
        self.data
            .column(header)
            .map(Some)
            .map_err(|_| DatasetError::MissingHeader {
                dataset: self.id.clone(),
                column,
                header: header.to_string(),
            })
    }

    /// Table column for `column`, which must be configured.
    pub fn require_column(&self, column: Column) -> Result<&FrameColumn> {
        self.require_column_name(column)?;
        self.get_column(column)?
            .ok_or_else(|| DatasetError::UnconfiguredColumn {
                dataset: self.id.clone(),
                column,
            })
    }

    /// Cells of `column` as text, or `None` when it is not configured.
    pub fn string_values(&self, column: Column) -> Result<Option<Vec<Option<String>>>> {
        Ok(self.get_column(column)?.map(column_strings))
    }

    /// Cells of a required column as text.
    pub fn require_string_values(&self, column: Column) -> Result<Vec<Option<String>>> {
        Ok(column_strings(self.require_column(column)?))
    }

    /// Renames the physical header of `column` and updates the mapping.
    pub fn rename_column(&mut self, column: Column, header: &str) -> Result<()> {
        let current = self.require_column_name(column)?.to_string();
        if current == header {
            return Ok(());
        }
        self.require_column(column)?;
        self.data.rename(&current, header.into())?;
        debug!(dataset = %self.id, %column, from = %current, to = header, "renamed column");
        self.columns.insert(column, header.to_string());
        Ok(())
    }

    /// Parsed values of the date column.
    ///
    /// Works on both raw text and already coerced columns.
    pub fn date_values(&self) -> Result<Vec<Option<NaiveDateTime>>> {
        let header = self.require_column_name(Column::Date)?;
        let column = self.require_column(Column::Date)?;
        if let DataType::Datetime(unit, _) = column.dtype() {
            let unit = *unit;
            let raw = column.cast(&DataType::Int64)?;
            return Ok(raw
                .i64()?
                .into_iter()
                .map(|value| value.and_then(|value| from_epoch_micros(to_micros(value, unit))))
                .collect());
        }
        column_strings(column)
            .into_iter()
            .map(|cell| match cell {
                None => Ok(None),
                Some(text) => {
                    parse_datetime(&text)
                        .map(Some)
                        .ok_or_else(|| DatasetError::DateParse {
                            dataset: self.id.clone(),
                            header: header.to_string(),
                            value: text,
                        })
                }
            })
            .collect()
    }

    /// Converts the date column to a timezone-naive datetime column.
    pub fn coerce_dates(&mut self) -> Result<()> {
        let header = self.require_column_name(Column::Date)?.to_string();
        let micros: Vec<Option<i64>> = self
            .date_values()?
            .into_iter()
            .map(|value| value.map(to_epoch_micros))
            .collect();
        let series = Series::new(header.as_str().into(), micros)
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
        self.data.with_column(series)?;
        Ok(())
    }

    /// Sorts rows by date, oldest first, nulls last. Ties keep table order.
    pub fn sort_by_date(&mut self) -> Result<()> {
        self.coerce_dates()?;
        let header = self.require_column_name(Column::Date)?.to_string();
        self.data = self
            .data
            .clone()
            .lazy()
            .sort_by_exprs(
                vec![col(header.as_str())],
                SortMultipleOptions::default()
                    .with_maintain_order(true)
                    .with_nulls_last(true),
            )
            .collect()?;
        Ok(())
    }

    /// Keeps rows whose date falls in any of the given months.
    ///
    /// Tokens are month names or ranges such as `"November-February"`.
    pub fn filter_by_months<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<()> {
        let months = parse_month_tokens(tokens)?;
        let keep: Vec<bool> = self
            .date_values()?
            .iter()
            .map(|value| value.is_some_and(|value| months.contains(&value.month())))
            .collect();
        self.retain(&keep, "months")
    }

    /// Keeps rows whose date falls in any of the given years or year ranges.
    pub fn filter_by_years<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<()> {
        let years = parse_year_tokens(tokens)?;
        let keep: Vec<bool> = self
            .date_values()?
            .iter()
            .map(|value| value.is_some_and(|value| years.contains(&value.year())))
            .collect();
        self.retain(&keep, "years")
    }

    /// Keeps rows whose date falls in any of `ranges`. An empty list keeps all rows.
    pub fn filter_by_date_ranges(&mut self, ranges: &[DateRange]) -> Result<()> {
        if ranges.is_empty() {
            return Ok(());
        }
        let keep: Vec<bool> = self
            .date_values()?
            .iter()
            .map(|value| value.is_some_and(|value| ranges.iter().any(|range| range.contains(value))))
            .collect();
        self.retain(&keep, "date ranges")
    }

    /// Keeps rows whose `column` text passes `spec`.
    ///
    /// Missing cells are matched as [`hsr_model::MISSING_VALUE`]. A column that
    /// is not configured leaves the table untouched.
    pub fn filter_by_column(&mut self, column: Column, spec: &FilterSpec) -> Result<()> {
        self.filter_rows(column, |value| spec.matches_optional(value))
    }

    fn filter_rows(&mut self, column: Column, predicate: impl Fn(Option<&str>) -> bool) -> Result<()> {
        let Some(values) = self.string_values(column)? else {
            warn!(dataset = %self.id, %column, "column not configured, skipping filter");
            return Ok(());
        };
        let keep: Vec<bool> = values
            .iter()
            .map(|value| predicate(value.as_deref()))
            .collect();
        self.retain(&keep, column.key())
    }

    fn retain(&mut self, keep: &[bool], operation: &str) -> Result<()> {
        let before = self.data.height();
        let mask = BooleanChunked::from_slice("keep".into(), keep);
        self.data = self.data.filter(&mask)?;
        debug!(
            dataset = %self.id,
            operation,
            removed = before - self.data.height(),
            remaining = self.data.height(),
            "filtered rows"
        );
        Ok(())
    }
}

impl Dataset<Appointments> {
    pub fn filter_staff_emails(&mut self, spec: &FilterSpec) -> Result<()> {
        self.filter_by_column(Column::StaffEmail, spec)
    }

    pub fn filter_student_emails(&mut self, spec: &FilterSpec) -> Result<()> {
        self.filter_by_column(Column::StudentEmail, spec)
    }

    /// Keeps appointments that were actually on the calendar.
    pub fn filter_appointment_status(&mut self) -> Result<()> {
        self.filter_rows(Column::Status, |value| {
            value
                .and_then(AppointmentStatus::parse)
                .is_some_and(|status| AppointmentStatus::VALID_SCHEDULED.contains(&status))
        })
    }

    pub fn filter_appointment_type(&mut self, spec: &FilterSpec) -> Result<()> {
        self.filter_by_column(Column::AppointmentType, spec)
    }

    pub fn filter_majors(&mut self, spec: &FilterSpec) -> Result<()> {
        self.filter_by_column(Column::StudentMajor, spec)
    }

    pub fn filter_schools(&mut self, spec: &FilterSpec) -> Result<()> {
        self.filter_by_column(Column::StudentCollege, spec)
    }
}

impl Dataset<Referrals> {
    pub fn filter_departments(&mut self, spec: &FilterSpec) -> Result<()> {
        self.filter_by_column(Column::ReferringDepartment, spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsr_model::Surveys;
    use polars::prelude::IntoColumn;

    fn survey_frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("Email".into(), vec![Some("a@x.edu"), None]).into_column(),
            Series::new("When".into(), vec![Some("2024-01-02"), Some("01/03/2024")])
                .into_column(),
        ])
        .unwrap()
    }

    fn surveys() -> Dataset<Surveys> {
        let columns = ColumnMap::from([
            (Column::StudentEmail, "Email".to_string()),
            (Column::Date, "When".to_string()),
        ]);
        Dataset::new("surveys", survey_frame(), columns).unwrap()
    }

    #[test]
    fn rename_updates_mapping_and_table() {
        let mut dataset = surveys();
        dataset.rename_column(Column::StudentEmail, "Student Email").unwrap();
        assert_eq!(
            dataset.get_column_name(Column::StudentEmail).unwrap(),
            Some("Student Email")
        );
        assert!(dataset.data().column("Student Email").is_ok());
        assert!(dataset.data().column("Email").is_err());
    }

    #[test]
    fn coerced_dates_are_datetime() {
        let mut dataset = surveys();
        dataset.coerce_dates().unwrap();
        let column = dataset.require_column(Column::Date).unwrap();
        assert_eq!(
            column.dtype(),
            &DataType::Datetime(TimeUnit::Microseconds, None)
        );
        let dates = dataset.date_values().unwrap();
        assert_eq!(dates[1].map(|value| value.day()), Some(3));
    }
}
