use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use csv::ReaderBuilder;
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Raw CSV contents with normalized headers and cells.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Reads a CSV export. The first non-blank row is the header.
pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(|value| value.is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }
    let mut rows = raw_rows.into_iter();
    let Some(header_row) = rows.next() else {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    };
    let headers: Vec<String> = header_row.iter().map(|value| normalize_header(value)).collect();
    let rows = rows
        .map(|record| {
            (0..headers.len())
                .map(|idx| record.get(idx).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    Ok(CsvTable { headers, rows })
}

impl CsvTable {
    /// Renames headers using `aliases` (source header → header to use).
    pub fn apply_aliases(&mut self, aliases: &BTreeMap<String, String>) {
        for header in &mut self.headers {
            if let Some(target) = aliases.get(header.as_str()) {
                debug!(from = %header, to = %target, "renaming header");
                *header = target.clone();
            }
        }
    }

    /// Converts the table into a DataFrame of string columns.
    ///
    /// Empty cells become nulls.
    pub fn into_frame(self, path: &Path) -> Result<DataFrame> {
        let mut seen = BTreeSet::new();
        for header in &self.headers {
            if !seen.insert(header.as_str()) {
                return Err(IngestError::DuplicateHeader {
                    header: header.clone(),
                    path: path.to_path_buf(),
                });
            }
        }
        let mut columns: Vec<Column> = Vec::with_capacity(self.headers.len());
        for (idx, header) in self.headers.iter().enumerate() {
            let values: Vec<Option<String>> = self
                .rows
                .iter()
                .map(|row| {
                    row.get(idx)
                        .filter(|value| !value.is_empty())
                        .cloned()
                })
                .collect();
            columns.push(Series::new(header.as_str().into(), values).into_column());
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Reads a CSV export into a DataFrame, renaming aliased headers on load.
pub fn read_csv_frame(path: &Path, aliases: &BTreeMap<String, String>) -> Result<DataFrame> {
    let mut table = read_csv_table(path)?;
    table.apply_aliases(aliases);
    debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "read csv export"
    );
    table.into_frame(path)
}
