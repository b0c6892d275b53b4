//! Report wrapper: runs an algorithm, archives the raw results and writes
//! the shaped, user-facing output.

use std::collections::BTreeMap;
use std::path::PathBuf;

use polars::prelude::DataFrame;
use tracing::{debug, info, warn};

use crate::algorithm::{ReportAlgorithm, computed};
use crate::error::{ReportError, Result};
use crate::frame::headers;
use crate::output::{timestamped_file_name, write_csv};

/// Where and how a report's results are written.
#[derive(Debug, Clone, Default)]
pub struct OutputSettings {
    pub file_prefix: String,
    pub results_dir: PathBuf,
    pub archive_dir: Option<PathBuf>,
    pub remove_cols: Vec<String>,
    pub rename_cols: BTreeMap<String, String>,
    pub final_cols: Option<Vec<String>>,
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Results were computed. Paths are `None` when nothing was written.
    Written {
        rows: usize,
        output: Option<PathBuf>,
        archive: Option<PathBuf>,
    },
    /// The report ran but selected no rows.
    Empty,
}

pub struct Report {
    label: String,
    algorithm: Box<dyn ReportAlgorithm>,
    settings: OutputSettings,
    dry_run: bool,
    shaped: Option<DataFrame>,
}

impl Report {
    pub fn new(
        label: impl Into<String>,
        algorithm: Box<dyn ReportAlgorithm>,
        settings: OutputSettings,
    ) -> Self {
        Self {
            label: label.into(),
            algorithm,
            settings,
            dry_run: false,
            shaped: None,
        }
    }

    /// Computes and shapes results without writing any files.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Human-readable identifier used in logs and the run summary.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &'static str {
        self.algorithm.name()
    }

    pub fn settings(&self) -> &OutputSettings {
        &self.settings
    }

    /// Raw results from the algorithm.
    pub fn results(&self) -> Result<&DataFrame> {
        self.algorithm.results()
    }

    /// Results after column removal, renaming and projection.
    pub fn output(&self) -> Result<&DataFrame> {
        computed(self.shaped.as_ref(), self.algorithm.name())
    }

    pub fn run(&mut self) -> Result<ReportOutcome> {
        info!(report = %self.label, kind = self.algorithm.name(), "running report");
        self.algorithm.run()?;
        let results = self.algorithm.results()?;
        let rows = results.height();
        if rows == 0 {
            warn!(report = %self.label, "report produced no rows, nothing written");
            return Ok(ReportOutcome::Empty);
        }

        let file_name = timestamped_file_name(&self.settings.file_prefix);
        let archive = match (&self.settings.archive_dir, self.dry_run) {
            (Some(dir), false) => {
                let path = write_csv(results, dir, &file_name)?;
                debug!(report = %self.label, path = %path.display(), "archived results");
                Some(path)
            }
            (None, _) => {
                debug!(report = %self.label, "no archive directory, skipping archive");
                None
            }
            (Some(_), true) => None,
        };

        let shaped = self.shape(results)?;
        let output = if self.dry_run {
            None
        } else {
            let path = write_csv(&shaped, &self.settings.results_dir, &file_name)?;
            info!(report = %self.label, rows, path = %path.display(), "wrote results");
            Some(path)
        };
        self.shaped = Some(shaped);
        Ok(ReportOutcome::Written {
            rows,
            output,
            archive,
        })
    }

    /// Applies `remove_cols`, the algorithm's hidden columns, `rename_cols`
    /// and `final_cols`, in that order.
    pub fn shape(&self, results: &DataFrame) -> Result<DataFrame> {
        let mut shaped = results.clone();
        for name in &self.settings.remove_cols {
            if shaped.column(name).is_ok() {
                shaped = shaped.drop(name)?;
            } else {
                warn!(report = %self.label, column = %name, "column to remove is not in results");
            }
        }
        for name in self.algorithm.hidden_columns() {
            if shaped.column(name).is_ok() {
                shaped = shaped.drop(name)?;
            }
        }
        for (from, to) in &self.settings.rename_cols {
            if shaped.column(from).is_ok() {
                shaped.rename(from, to.as_str().into())?;
            } else {
                warn!(report = %self.label, column = %from, "column to rename is not in results");
            }
        }
        if let Some(final_cols) = &self.settings.final_cols {
            let present = headers(&shaped);
            if let Some(missing) = final_cols.iter().find(|name| !present.contains(name)) {
                return Err(ReportError::MissingOutputColumn {
                    report: self.label.clone(),
                    column: missing.clone(),
                });
            }
            shaped = shaped.select(final_cols.iter().map(String::as_str))?;
        }
        Ok(shaped)
    }
}
