//! Typed views over loaded exports.
//!
//! - **dataset**: [`Dataset`], a table plus its logical-column mapping, with
//!   date coercion, sorting and row filters
//! - **datetime**: parsing of the date formats found in exports
//! - **error**: [`DatasetError`] and the shared [`ErrorKind`] taxonomy

pub mod dataset;
pub mod datetime;
pub mod error;

pub use dataset::Dataset;
pub use datetime::{from_epoch_micros, parse_datetime, to_epoch_micros};
pub use error::{DatasetError, ErrorKind, Result};
