//! Error types for report runs.

use std::path::PathBuf;

use hsr_dataset::{DatasetError, ErrorKind};
use thiserror::Error;

/// Errors raised while computing or writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Results were requested before a successful run.
    #[error("results for the {report} report have not been computed")]
    ResultsNotComputed { report: String },

    /// A `final_cols` entry does not exist in the shaped results.
    #[error("output column '{column}' is not in the {report} results")]
    MissingOutputColumn { report: String, column: String },

    /// A student card id is neither empty nor numeric after stripping the prefix.
    #[error("cannot normalize card id '{value}'")]
    InvalidCardId { value: String },

    /// Failed to create an output directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an output CSV.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Dataset(err) => err.kind(),
            Self::ResultsNotComputed { .. } => ErrorKind::Configuration,
            Self::MissingOutputColumn { .. }
            | Self::InvalidCardId { .. }
            | Self::CreateDir { .. }
            | Self::Write { .. }
            | Self::DataFrame { .. } => ErrorKind::Data,
        }
    }
}

impl From<polars::prelude::PolarsError> for ReportError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;
    use hsr_model::{Column, ValidationError};

    #[test]
    fn dataset_errors_keep_their_kind() {
        let err: ReportError = DatasetError::UnconfiguredColumn {
            dataset: "appointments".to_string(),
            column: Column::Status,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err: ReportError = DatasetError::from(ValidationError::EmptyMonths).into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn card_id_errors_are_data_errors() {
        let err = ReportError::InvalidCardId {
            value: "GX1".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Data);
        assert_eq!(err.to_string(), "cannot normalize card id 'GX1'");
    }
}
