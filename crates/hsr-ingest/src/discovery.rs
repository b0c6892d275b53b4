//! Export discovery.
//!
//! The scheduling platform drops a new export into the same directory every
//! time someone downloads one, so a configured source is resolved to the most
//! recently modified CSV whose name contains a fixed fragment.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// Lists all CSV files in a directory.
///
/// Returns files sorted by filename.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        // Check for .csv extension (case-insensitive)
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// Keeps the files whose file name contains `must_contain`.
pub fn matching_files(files: &[PathBuf], must_contain: &str) -> Vec<PathBuf> {
    files
        .iter()
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.contains(must_contain))
        })
        .cloned()
        .collect()
}

/// Resolves the most recently modified matching CSV in `dir`.
pub fn most_recent_file(dir: &Path, must_contain: &str) -> Result<PathBuf> {
    debug!(dir = %dir.display(), must_contain, "searching for csv exports");
    let all = list_csv_files(dir)?;
    debug!(count = all.len(), "found csv files");
    let candidates = matching_files(&all, must_contain);
    if candidates.is_empty() {
        warn!(dir = %dir.display(), must_contain, "no matching csv exports");
        return Err(IngestError::NoMatchingFile {
            dir: dir.to_path_buf(),
            must_contain: must_contain.to_string(),
        });
    }

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for path in candidates {
        let modified = std::fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        // Later files win ties so the lexically last name is picked.
        if newest.as_ref().is_none_or(|(best, _)| modified >= *best) {
            newest = Some((modified, path));
        }
    }
    newest
        .map(|(_, path)| path)
        .ok_or_else(|| IngestError::NoMatchingFile {
            dir: dir.to_path_buf(),
            must_contain: must_contain.to_string(),
        })
}
