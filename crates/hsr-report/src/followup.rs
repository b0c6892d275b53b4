//! Followup report.
//!
//! Finds students whose most recent "needs followup" appointment has not been
//! followed by a followup-type appointment. Appointment types are split into
//! two groups by pattern: rows matching `require_followup`, and followup rows
//! (the complement, or rows matching `followup_types` when given).

use std::collections::BTreeMap;

use hsr_dataset::Dataset;
use hsr_ingest::column_strings;
use hsr_model::{Appointments, Column, FilterSpec};
use polars::prelude::{
    DataFrame, IntoLazy, JoinArgs, JoinType, SortMultipleOptions, col, len, lit,
};
use tracing::debug;

use crate::algorithm::{PeriodSelection, ReportAlgorithm, computed};
use crate::error::Result;
use crate::frame::{datetime_micros, filter_rows, take_rows};

/// Date of the student's most recent followup-type appointment.
pub const LAST_FOLLOWUP_COLUMN: &str = "date of last followup appointment";

/// Number of followup-type appointments the student has had.
pub const FOLLOWUP_COUNT_COLUMN: &str = "# of past followup appointments";

pub struct FollowupReport {
    appointments: Dataset<Appointments>,
    require_followup: FilterSpec,
    followup_types: Option<FilterSpec>,
    valid_schools: Option<FilterSpec>,
    period: PeriodSelection,
    results: Option<DataFrame>,
}

impl FollowupReport {
    pub fn new(appointments: Dataset<Appointments>, require_followup: FilterSpec) -> Self {
        Self {
            appointments,
            require_followup,
            followup_types: None,
            valid_schools: None,
            period: PeriodSelection::default(),
            results: None,
        }
    }

    /// Counts only these types as followups instead of every other type.
    pub fn with_followup_types(mut self, followup_types: FilterSpec) -> Self {
        self.followup_types = Some(followup_types);
        self
    }

    pub fn with_schools(mut self, valid_schools: FilterSpec) -> Self {
        self.valid_schools = Some(valid_schools);
        self
    }

    pub fn with_period(mut self, period: PeriodSelection) -> Self {
        self.period = period;
        self
    }

    fn restrict_appointments(&mut self) -> Result<()> {
        self.appointments.coerce_dates()?;
        if let Some(schools) = &self.valid_schools {
            self.appointments.filter_schools(schools)?;
        }
        self.period.apply(&mut self.appointments)?;
        Ok(())
    }

    /// Masks for needs-followup rows and followup rows.
    fn partition(&self) -> Result<(Vec<bool>, Vec<bool>)> {
        let types = self
            .appointments
            .require_string_values(Column::AppointmentType)?;
        let needs: Vec<bool> = types
            .iter()
            .map(|value| self.require_followup.matches_optional(value.as_deref()))
            .collect();
        let followups = match &self.followup_types {
            Some(spec) => types
                .iter()
                .map(|value| spec.matches_optional(value.as_deref()))
                .collect(),
            None => needs.iter().map(|need| !need).collect(),
        };
        Ok((needs, followups))
    }
}

/// Most recent row per email, ordered by email.
///
/// Ties on the date keep the earlier row. Rows without an email or a date
/// are dropped.
fn latest_per_student(df: &DataFrame, email: &str, date: &str) -> Result<DataFrame> {
    let emails = column_strings(df.column(email)?);
    let dates = datetime_micros(df, date)?;
    let mut latest: BTreeMap<String, (i64, usize)> = BTreeMap::new();
    for (idx, (email, date)) in emails.into_iter().zip(dates).enumerate() {
        let (Some(email), Some(date)) = (email, date) else {
            continue;
        };
        match latest.get(&email) {
            Some((best, _)) if *best >= date => {}
            _ => {
                latest.insert(email, (date, idx));
            }
        }
    }
    let indices: Vec<usize> = latest.values().map(|(_, idx)| *idx).collect();
    take_rows(df, &indices)
}

impl ReportAlgorithm for FollowupReport {
    fn name(&self) -> &'static str {
        "followup"
    }

    fn run(&mut self) -> Result<()> {
        self.restrict_appointments()?;
        let email = self
            .appointments
            .require_column_name(Column::StudentEmail)?
            .to_string();
        let date = self.appointments.require_column_name(Column::Date)?.to_string();

        let (needs, followups) = self.partition()?;
        let needs_followup = filter_rows(self.appointments.data(), &needs)?;
        let followup = filter_rows(self.appointments.data(), &followups)?;
        debug!(
            needs_followup = needs_followup.height(),
            followup = followup.height(),
            "partitioned appointments"
        );

        let last_followup = followup
            .clone()
            .lazy()
            .group_by([col(email.as_str())])
            .agg([col(date.as_str()).max().alias(LAST_FOLLOWUP_COLUMN)]);
        let outstanding = needs_followup
            .lazy()
            .join(
                last_followup,
                [col(email.as_str())],
                [col(email.as_str())],
                JoinArgs::new(JoinType::Left),
            )
            .filter(
                col(date.as_str()).is_not_null().and(
                    col(LAST_FOLLOWUP_COLUMN)
                        .is_null()
                        .or(col(date.as_str()).gt_eq(col(LAST_FOLLOWUP_COLUMN))),
                ),
            )
            .collect()?;
        debug!(rows = outstanding.height(), "removed followed-up appointments");

        let latest = latest_per_student(&outstanding, &email, &date)?;
        debug!(students = latest.height(), "kept latest appointment per student");

        let counts = followup
            .lazy()
            .group_by([col(email.as_str())])
            .agg([len().alias(FOLLOWUP_COUNT_COLUMN)]);
        let results = latest
            .lazy()
            .join(
                counts,
                [col(email.as_str())],
                [col(email.as_str())],
                JoinArgs::new(JoinType::Left),
            )
            .with_column(col(FOLLOWUP_COUNT_COLUMN).fill_null(lit(0)))
            .sort_by_exprs(
                vec![col(email.as_str())],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .collect()?;
        self.results = Some(results);
        Ok(())
    }

    fn results(&self) -> Result<&DataFrame> {
        computed(self.results.as_ref(), self.name())
    }
}
