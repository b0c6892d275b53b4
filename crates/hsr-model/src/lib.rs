//! Core vocabulary for the appointment report pipeline.
//!
//! Nothing in this crate touches tables. It defines:
//!
//! - **column**: logical column names and the dataset kinds that declare them
//! - **filter**: include/exclude pattern specifications
//! - **period**: month, year and date-range selectors
//! - **status**: appointment status groups

pub mod column;
pub mod error;
pub mod filter;
pub mod period;
pub mod status;

pub use column::{
    Appointments, Column, ColumnMap, DatasetKind, Enrollment, KindName, Referrals, Surveys,
};
pub use error::{FilterError, ValidationError};
pub use filter::{FilterConfig, FilterSpec, MISSING_VALUE, PatternList};
pub use period::{DateRange, month_name, parse_month_tokens, parse_year_tokens};
pub use status::AppointmentStatus;
