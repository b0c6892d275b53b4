//! Tests for the report wrapper: archiving, column shaping and CSV output.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use hsr_report::{OutputSettings, Report, ReportAlgorithm, ReportError, ReportOutcome, Result};
use polars::prelude::{DataFrame, DataType, IntoColumn, NamedFrom, Series, TimeUnit};
use tempfile::TempDir;

const DAY_MICROS: i64 = 86_400_000_000;

/// Algorithm that returns a fixed table.
struct Fixed {
    table: DataFrame,
    results: Option<DataFrame>,
    hidden: &'static [&'static str],
}

impl Fixed {
    fn new(table: DataFrame) -> Self {
        Self {
            table,
            results: None,
            hidden: &[],
        }
    }
}

impl ReportAlgorithm for Fixed {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn run(&mut self) -> Result<()> {
        self.results = Some(self.table.clone());
        Ok(())
    }

    fn results(&self) -> Result<&DataFrame> {
        self.results
            .as_ref()
            .ok_or_else(|| ReportError::ResultsNotComputed {
                report: "fixed".to_string(),
            })
    }

    fn hidden_columns(&self) -> &'static [&'static str] {
        self.hidden
    }
}

fn sample() -> DataFrame {
    let when = Series::new("When".into(), vec![Some(DAY_MICROS + 3_600_000_000), None])
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
        .unwrap();
    let gap = Series::new("Gap".into(), vec![Some(2 * DAY_MICROS), None])
        .cast(&DataType::Duration(TimeUnit::Microseconds))
        .unwrap();
    DataFrame::new(vec![
        Series::new("Email".into(), vec![Some("a@x.edu"), Some("b@x.edu")]).into_column(),
        Series::new("Name".into(), vec![Some("Ann"), None]).into_column(),
        when.into_column(),
        gap.into_column(),
    ])
    .unwrap()
}

fn settings(dir: &Path) -> OutputSettings {
    OutputSettings {
        file_prefix: "fixed_".to_string(),
        results_dir: dir.join("results"),
        archive_dir: Some(dir.join("archive")),
        ..OutputSettings::default()
    }
}

fn only_file(dir: &Path) -> String {
    let entries: Vec<_> = fs::read_dir(dir).unwrap().map(|entry| entry.unwrap().path()).collect();
    assert_eq!(entries.len(), 1);
    let name = entries[0].file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with("fixed_") && name.ends_with(".csv"));
    fs::read_to_string(&entries[0]).unwrap()
}

#[test]
fn archives_raw_results_and_writes_shaped_output() {
    let dir = TempDir::new().unwrap();
    let mut settings = settings(dir.path());
    settings.remove_cols = vec!["Gap".to_string(), "Not There".to_string()];
    settings.rename_cols = BTreeMap::from([("Name".to_string(), "First Name".to_string())]);
    settings.final_cols = Some(vec!["First Name".to_string(), "Email".to_string()]);

    let mut report = Report::new("fixed", Box::new(Fixed::new(sample())), settings);
    let outcome = report.run().unwrap();
    let ReportOutcome::Written {
        rows,
        output,
        archive,
    } = outcome
    else {
        panic!("expected written outcome");
    };
    assert_eq!(rows, 2);
    assert!(output.is_some());
    assert!(archive.is_some());

    insta::assert_snapshot!(only_file(&dir.path().join("archive")).trim_end(), @r"
    Email,Name,When,Gap
    a@x.edu,Ann,1970-01-02 01:00:00,2 days 00:00:00
    b@x.edu,,,
    ");
    insta::assert_snapshot!(only_file(&dir.path().join("results")).trim_end(), @r"
    First Name,Email
    Ann,a@x.edu
    ,b@x.edu
    ");
}

#[test]
fn empty_results_write_nothing() {
    let dir = TempDir::new().unwrap();
    let empty = sample().head(Some(0));
    let mut report = Report::new("fixed", Box::new(Fixed::new(empty)), settings(dir.path()));
    assert_eq!(report.run().unwrap(), ReportOutcome::Empty);
    assert!(!dir.path().join("results").exists());
    assert!(!dir.path().join("archive").exists());
}

#[test]
fn missing_final_column_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut settings = settings(dir.path());
    settings.final_cols = Some(vec!["Email".to_string(), "Major".to_string()]);
    let mut report = Report::new("fixed", Box::new(Fixed::new(sample())), settings);
    let err = report.run().unwrap_err();
    assert!(matches!(
        err,
        ReportError::MissingOutputColumn { ref column, .. } if column == "Major"
    ));
    assert!(!dir.path().join("results").exists());
}

#[test]
fn hidden_columns_are_dropped_from_output_only() {
    let dir = TempDir::new().unwrap();
    let mut algorithm = Fixed::new(sample());
    algorithm.hidden = &["Gap"];
    let mut report = Report::new("fixed", Box::new(algorithm), settings(dir.path()));
    report.run().unwrap();

    let output = report.output().unwrap();
    assert!(output.column("Gap").is_err());
    assert!(report.results().unwrap().column("Gap").is_ok());
    assert!(only_file(&dir.path().join("archive")).starts_with("Email,Name,When,Gap"));
    assert!(only_file(&dir.path().join("results")).starts_with("Email,Name,When\n"));
}

#[test]
fn dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut report =
        Report::new("fixed", Box::new(Fixed::new(sample())), settings(dir.path())).with_dry_run(true);
    let outcome = report.run().unwrap();
    assert_eq!(
        outcome,
        ReportOutcome::Written {
            rows: 2,
            output: None,
            archive: None,
        }
    );
    assert!(!dir.path().join("results").exists());
    assert_eq!(report.output().unwrap().height(), 2);
}

#[test]
fn output_before_run_fails() {
    let dir = TempDir::new().unwrap();
    let report = Report::new("fixed", Box::new(Fixed::new(sample())), settings(dir.path()));
    assert!(matches!(
        report.output(),
        Err(ReportError::ResultsNotComputed { .. })
    ));
}
