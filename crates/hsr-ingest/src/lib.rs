pub mod csv_table;
pub mod discovery;
pub mod error;
pub mod polars_utils;

pub use csv_table::{CsvTable, read_csv_frame, read_csv_table};
pub use discovery::{list_csv_files, matching_files, most_recent_file};
pub use error::{IngestError, Result};
pub use polars_utils::{
    any_to_string, any_to_string_non_empty, column_strings, format_datetime_micros,
    format_duration_micros, format_numeric, to_micros,
};
