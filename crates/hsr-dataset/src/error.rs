//! Error types for dataset operations.

use hsr_model::{Column, KindName, ValidationError};
use thiserror::Error;

/// Broad category of a failure, used for logging and the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configuration asked for something the data model does not allow.
    Configuration,
    /// The loaded data does not look like the configuration says it does.
    Data,
    /// A user-supplied selector was malformed.
    Validation,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Data => "data",
            Self::Validation => "validation",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by [`crate::Dataset`] operations.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A mapping or lookup used a column the dataset kind does not declare.
    #[error("column '{column}' is not declared for {kind} datasets")]
    UndeclaredColumn { kind: KindName, column: Column },

    /// An operation needs a column that the dataset does not map.
    #[error("dataset '{dataset}' has no header configured for '{column}'")]
    UnconfiguredColumn { dataset: String, column: Column },

    /// The configured header is not present in the loaded table.
    #[error("dataset '{dataset}' maps '{column}' to header '{header}', which is not in the table")]
    MissingHeader {
        dataset: String,
        column: Column,
        header: String,
    },

    /// A date cell could not be parsed.
    #[error("dataset '{dataset}' column '{header}': cannot parse '{value}' as a date")]
    DateParse {
        dataset: String,
        header: String,
        value: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl DatasetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UndeclaredColumn { .. } | Self::UnconfiguredColumn { .. } => {
                ErrorKind::Configuration
            }
            Self::MissingHeader { .. } | Self::DateParse { .. } | Self::DataFrame { .. } => {
                ErrorKind::Data
            }
            Self::Validation(_) => ErrorKind::Validation,
        }
    }
}

impl From<polars::prelude::PolarsError> for DatasetError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;
