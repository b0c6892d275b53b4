//! Survey results report.
//!
//! Pairs each post-appointment survey response with the student's most recent
//! appointment at or before the response, within a tolerance of `day_range`
//! days, and keeps the responses that came after their appointment.

use std::collections::HashMap;

use hsr_dataset::Dataset;
use hsr_ingest::column_strings;
use hsr_model::{Appointments, Column, FilterSpec, Surveys};
use polars::prelude::{DataFrame, DataType, NamedFrom, Series, TimeUnit};
use tracing::debug;

use crate::algorithm::{PeriodSelection, ReportAlgorithm, computed};
use crate::error::Result;
use crate::frame::{datetime_micros, headers, joined_name, take_rows};

/// Survey date minus appointment date.
pub const TIME_DIFFERENCE_COLUMN: &str = "Time_Difference";

/// Suffix for appointment headers that collide with survey headers.
pub const APPOINTMENT_SUFFIX: &str = "_appointment";

const MICROS_PER_DAY: i64 = 86_400 * 1_000_000;

/// A survey row matched to the appointment it was sent for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pairing {
    survey: usize,
    appointment: usize,
    elapsed_micros: i64,
}

/// Backward as-of match of surveys to appointments by email.
///
/// `appointments` must be in date order. For equal dates the later row wins.
fn pair_surveys(
    surveys: &[(Option<String>, Option<i64>)],
    appointments: &[(Option<String>, Option<i64>)],
    tolerance_micros: i64,
) -> Vec<Pairing> {
    let mut by_email: HashMap<&str, Vec<(i64, usize)>> = HashMap::new();
    for (idx, (email, date)) in appointments.iter().enumerate() {
        if let (Some(email), Some(date)) = (email, date) {
            by_email.entry(email.as_str()).or_default().push((*date, idx));
        }
    }

    let mut pairings = Vec::new();
    for (idx, (email, date)) in surveys.iter().enumerate() {
        let (Some(email), Some(date)) = (email, date) else {
            continue;
        };
        let Some(candidates) = by_email.get(email.as_str()) else {
            continue;
        };
        let at_or_before = candidates.partition_point(|(appointment, _)| appointment <= date);
        let Some((appointment_date, appointment)) = at_or_before
            .checked_sub(1)
            .and_then(|pos| candidates.get(pos))
        else {
            continue;
        };
        let elapsed_micros = date - appointment_date;
        if elapsed_micros <= tolerance_micros {
            pairings.push(Pairing {
                survey: idx,
                appointment: *appointment,
                elapsed_micros,
            });
        }
    }
    pairings
}

pub struct SurveyResultsReport {
    appointments: Dataset<Appointments>,
    surveys: Dataset<Surveys>,
    day_range: u32,
    period: PeriodSelection,
    staff_emails: Option<FilterSpec>,
    results: Option<DataFrame>,
}

impl SurveyResultsReport {
    pub fn new(appointments: Dataset<Appointments>, surveys: Dataset<Surveys>, day_range: u32) -> Self {
        Self {
            appointments,
            surveys,
            day_range,
            period: PeriodSelection::default(),
            staff_emails: None,
            results: None,
        }
    }

    pub fn with_period(mut self, period: PeriodSelection) -> Self {
        self.period = period;
        self
    }

    pub fn with_staff_emails(mut self, staff_emails: FilterSpec) -> Self {
        self.staff_emails = Some(staff_emails);
        self
    }

    fn keyed_dates<K: hsr_model::DatasetKind>(
        dataset: &Dataset<K>,
    ) -> Result<Vec<(Option<String>, Option<i64>)>> {
        let emails = column_strings(dataset.require_column(Column::StudentEmail)?);
        let dates = datetime_micros(dataset.data(), dataset.require_column_name(Column::Date)?)?;
        Ok(emails.into_iter().zip(dates).collect())
    }

    /// Survey rows beside their appointment rows, plus the elapsed time.
    fn assemble(&self, pairings: &[Pairing]) -> Result<DataFrame> {
        let email = self.appointments.require_column_name(Column::StudentEmail)?;
        let survey_rows: Vec<usize> = pairings.iter().map(|pairing| pairing.survey).collect();
        let appointment_rows: Vec<usize> =
            pairings.iter().map(|pairing| pairing.appointment).collect();

        let left = take_rows(self.surveys.data(), &survey_rows)?;
        let left_headers = headers(&left);
        let right: Vec<_> = take_rows(self.appointments.data(), &appointment_rows)?
            .get_columns()
            .iter()
            .filter(|column| column.name().as_str() != email)
            .map(|column| {
                let name = joined_name(column.name(), &left_headers, email, APPOINTMENT_SUFFIX);
                column.clone().with_name(name.into())
            })
            .collect();
        let mut results = left.hstack(&right)?;

        let elapsed: Vec<i64> = pairings.iter().map(|pairing| pairing.elapsed_micros).collect();
        let elapsed = Series::new(TIME_DIFFERENCE_COLUMN.into(), elapsed)
            .cast(&DataType::Duration(TimeUnit::Microseconds))?;
        results.with_column(elapsed)?;
        Ok(results)
    }
}

impl ReportAlgorithm for SurveyResultsReport {
    fn name(&self) -> &'static str {
        "survey_results"
    }

    fn run(&mut self) -> Result<()> {
        self.appointments.sort_by_date()?;
        self.surveys.sort_by_date()?;

        self.appointments.filter_appointment_status()?;
        self.period.apply(&mut self.appointments)?;
        if let Some(spec) = &self.staff_emails {
            self.appointments.filter_staff_emails(spec)?;
        }

        let email = self
            .appointments
            .require_column_name(Column::StudentEmail)?
            .to_string();
        self.surveys.rename_column(Column::StudentEmail, &email)?;

        let tolerance_micros = i64::from(self.day_range) * MICROS_PER_DAY;
        let pairings = pair_surveys(
            &Self::keyed_dates(&self.surveys)?,
            &Self::keyed_dates(&self.appointments)?,
            tolerance_micros,
        );
        let matched = pairings.len();
        let pairings: Vec<Pairing> = pairings
            .into_iter()
            .filter(|pairing| pairing.elapsed_micros > 0)
            .collect();
        debug!(
            surveys = self.surveys.height(),
            matched,
            kept = pairings.len(),
            "matched surveys to appointments"
        );

        self.results = Some(self.assemble(&pairings)?);
        Ok(())
    }

    fn results(&self) -> Result<&DataFrame> {
        computed(self.results.as_ref(), self.name())
    }

    fn hidden_columns(&self) -> &'static [&'static str] {
        &[TIME_DIFFERENCE_COLUMN]
    }
}
