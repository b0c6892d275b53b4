//! Report algorithm trait and shared selectors.
//!
//! Each report owns deep copies of the datasets it reads, runs once, and
//! exposes a single results table. The [`crate::Report`] wrapper handles
//! everything after that (archiving, column shaping, output).

use hsr_dataset::Dataset;
use hsr_model::{DateRange, DatasetKind};
use polars::prelude::DataFrame;

use crate::error::{ReportError, Result};

/// A report computation over one or more datasets.
pub trait ReportAlgorithm {
    /// Configuration name of the report (e.g. `"followup"`).
    fn name(&self) -> &'static str;

    /// Computes the results table.
    fn run(&mut self) -> Result<()>;

    /// Results of the last successful run.
    fn results(&self) -> Result<&DataFrame>;

    /// Columns that never appear in the user-facing output.
    fn hidden_columns(&self) -> &'static [&'static str] {
        &[]
    }
}

/// Fails with [`ReportError::ResultsNotComputed`] until `results` is set.
pub(crate) fn computed<'a>(results: Option<&'a DataFrame>, report: &str) -> Result<&'a DataFrame> {
    results.ok_or_else(|| ReportError::ResultsNotComputed {
        report: report.to_string(),
    })
}

/// Optional date-range, year and month restrictions on a dataset's dates.
#[derive(Debug, Clone, Default)]
pub struct PeriodSelection {
    pub date_ranges: Vec<DateRange>,
    pub years: Option<Vec<String>>,
    pub months: Option<Vec<String>>,
}

impl PeriodSelection {
    /// Applies each configured restriction in turn: date ranges, years, months.
    pub fn apply<K: DatasetKind>(&self, dataset: &mut Dataset<K>) -> Result<()> {
        dataset.filter_by_date_ranges(&self.date_ranges)?;
        if let Some(years) = &self.years {
            dataset.filter_by_years(years.as_slice())?;
        }
        if let Some(months) = &self.months {
            dataset.filter_by_months(months.as_slice())?;
        }
        Ok(())
    }
}
