//! CSV output for report results.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use csv::Writer;
use hsr_ingest::column_strings;
use polars::prelude::DataFrame;

use crate::error::{ReportError, Result};

/// Output file name: the prefix followed by a `YYYYMMDD-HHMMSS` stamp.
pub fn output_file_name(prefix: &str, at: NaiveDateTime) -> String {
    format!("{prefix}{}.csv", at.format("%Y%m%d-%H%M%S"))
}

/// Output file name stamped with the current local time.
pub fn timestamped_file_name(prefix: &str) -> String {
    output_file_name(prefix, Local::now().naive_local())
}

/// Writes `df` to `dir/file_name`, creating `dir` if needed.
///
/// Datetimes are written as `YYYY-MM-DD HH:MM:SS`, durations as
/// `N days HH:MM:SS`, and nulls as empty cells.
pub fn write_csv(df: &DataFrame, dir: &Path, file_name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|source| ReportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(file_name);
    let write_err = |source| ReportError::Write {
        path: path.clone(),
        source,
    };

    let mut writer = Writer::from_path(&path).map_err(write_err)?;
    let headers: Vec<&str> = df
        .get_column_names()
        .iter()
        .map(|name| name.as_str())
        .collect();
    writer.write_record(&headers).map_err(write_err)?;

    let cells: Vec<Vec<Option<String>>> = df.get_columns().iter().map(column_strings).collect();
    for idx in 0..df.height() {
        let record = cells
            .iter()
            .map(|column| column.get(idx).cloned().flatten().unwrap_or_default());
        writer.write_record(record).map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|source| write_err(csv::Error::from(source)))?;
    Ok(path)
}
