//! Report algorithms and output.
//!
//! - **algorithm**: the [`ReportAlgorithm`] trait and shared period selectors
//! - **followup**: students who still need a followup appointment
//! - **referrals**: referred students and whether they scheduled or completed
//!   an appointment afterwards
//! - **survey_results**: survey responses matched to the appointment they follow
//! - **report**: the [`Report`] wrapper that archives, shapes and writes results

pub mod algorithm;
pub mod error;
pub mod followup;
mod frame;
pub mod output;
pub mod referrals;
pub mod report;
pub mod survey_results;

pub use algorithm::{PeriodSelection, ReportAlgorithm};
pub use error::{ReportError, Result};
pub use followup::{FOLLOWUP_COUNT_COLUMN, FollowupReport, LAST_FOLLOWUP_COLUMN};
pub use output::{output_file_name, write_csv};
pub use referrals::{COMPLETED_COLUMN, ReferralsReport, SCHEDULED_COLUMN, normalize_card_id};
pub use report::{OutputSettings, Report, ReportOutcome};
pub use survey_results::{SurveyResultsReport, TIME_DIFFERENCE_COLUMN};
