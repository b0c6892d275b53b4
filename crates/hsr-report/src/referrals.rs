//! Referrals report.
//!
//! Lists referred students together with whether they went on to schedule or
//! complete a qualifying appointment after the referral.

use std::collections::BTreeSet;

use hsr_dataset::Dataset;
use hsr_ingest::column_strings;
use hsr_model::{AppointmentStatus, Appointments, Column, Enrollment, FilterSpec, Referrals};
use polars::prelude::{DataFrame, IntoColumn, IntoLazy, JoinType, NamedFrom, Series, col};
use tracing::debug;

use crate::algorithm::{ReportAlgorithm, computed};
use crate::error::{ReportError, Result};
use crate::frame::{
    datetime_micros, filter_rows, headers, join_args, joined_name, prepend_columns,
};

/// `"TRUE"` when the referred student completed a qualifying appointment.
pub const COMPLETED_COLUMN: &str = "Completed";

/// `"TRUE"` when the referred student scheduled a qualifying appointment.
pub const SCHEDULED_COLUMN: &str = "Scheduled";

/// Suffix for appointment headers that collide with referral headers.
pub const APPOINTMENT_SUFFIX: &str = "_appointment";

/// Suffix for right-hand headers that collide in later merges.
pub const MERGE_SUFFIX: &str = "_";

/// Card id placeholder for students without one.
pub const MISSING_CARD_ID: i64 = -1;

/// Normalizes a student card id such as `"G12345"` to `12345`.
///
/// Missing ids become [`MISSING_CARD_ID`].
pub fn normalize_card_id(value: Option<&str>) -> Result<i64> {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(MISSING_CARD_ID);
    };
    let digits = raw.strip_prefix('G').unwrap_or(raw);
    digits
        .parse::<i64>()
        .map_err(|_| ReportError::InvalidCardId {
            value: raw.to_string(),
        })
}

fn normalize_card_column(df: &mut DataFrame, header: &str) -> Result<()> {
    let normalized = column_strings(df.column(header)?)
        .iter()
        .map(|value| normalize_card_id(value.as_deref()))
        .collect::<Result<Vec<i64>>>()?;
    df.with_column(Series::new(header.into(), normalized))?;
    Ok(())
}

fn flags(values: impl Iterator<Item = bool>) -> Vec<&'static str> {
    values
        .map(|flag| if flag { "TRUE" } else { "FALSE" })
        .collect()
}

pub struct ReferralsReport {
    referrals: Dataset<Referrals>,
    appointments: Dataset<Appointments>,
    complete_types: Option<FilterSpec>,
    valid_departments: Option<FilterSpec>,
    enrollment: Option<Dataset<Enrollment>>,
    merge_on: Option<String>,
    results: Option<DataFrame>,
}

impl ReferralsReport {
    pub fn new(referrals: Dataset<Referrals>, appointments: Dataset<Appointments>) -> Self {
        Self {
            referrals,
            appointments,
            complete_types: None,
            valid_departments: None,
            enrollment: None,
            merge_on: None,
            results: None,
        }
    }

    /// Only appointments of these types count as following up on a referral.
    pub fn with_complete_types(mut self, complete_types: FilterSpec) -> Self {
        self.complete_types = Some(complete_types);
        self
    }

    pub fn with_departments(mut self, valid_departments: FilterSpec) -> Self {
        self.valid_departments = Some(valid_departments);
        self
    }

    /// Left-joins enrollment records on `merge_on`, or on the enrollment
    /// card-id header when `merge_on` is `None`.
    pub fn with_enrollment(mut self, enrollment: Dataset<Enrollment>, merge_on: Option<String>) -> Self {
        self.enrollment = Some(enrollment);
        self.merge_on = merge_on;
        self
    }

    /// Appointment header as it appears after merging onto referrals.
    fn merged_appointment_header(&self, column: Column) -> Result<String> {
        let email = self.referrals.require_column_name(Column::StudentEmail)?;
        let header = self.appointments.require_column_name(column)?;
        Ok(joined_name(
            header,
            &headers(self.referrals.data()),
            email,
            APPOINTMENT_SUFFIX,
        ))
    }

    /// Pairs every referral with every qualifying appointment of the student,
    /// dropping appointments from before the referral.
    fn merge_appointments(&mut self) -> Result<DataFrame> {
        let email = self
            .referrals
            .require_column_name(Column::StudentEmail)?
            .to_string();
        self.appointments.rename_column(Column::StudentEmail, &email)?;

        let merged = self
            .referrals
            .data()
            .clone()
            .lazy()
            .join(
                self.appointments.data().clone().lazy(),
                [col(email.as_str())],
                [col(email.as_str())],
                join_args(JoinType::Full, APPOINTMENT_SUFFIX),
            )
            .collect()?;
        debug!(rows = merged.height(), "merged referrals with appointments");

        let referral_dates = datetime_micros(&merged, self.referrals.require_column_name(Column::Date)?)?;
        let appointment_dates =
            datetime_micros(&merged, &self.merged_appointment_header(Column::Date)?)?;
        let keep: Vec<bool> = referral_dates
            .iter()
            .zip(&appointment_dates)
            .map(|(referral, appointment)| match (referral, appointment) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(referral), Some(appointment)) => appointment >= referral,
            })
            .collect();
        let current = filter_rows(&merged, &keep)?;
        debug!(rows = current.height(), "removed past appointments");
        Ok(current)
    }

    fn add_flags(&self, df: &DataFrame) -> Result<DataFrame> {
        let scheduled_header = self.merged_appointment_header(Column::DateScheduled)?;
        let status_header = self.merged_appointment_header(Column::Status)?;
        let scheduled = flags(
            column_strings(df.column(&scheduled_header)?)
                .iter()
                .map(Option::is_some),
        );
        let completed = flags(column_strings(df.column(&status_header)?).iter().map(|value| {
            value
                .as_deref()
                .and_then(AppointmentStatus::parse)
                .is_some_and(AppointmentStatus::is_completed)
        }));
        prepend_columns(
            df,
            vec![
                Series::new(COMPLETED_COLUMN.into(), completed).into_column(),
                Series::new(SCHEDULED_COLUMN.into(), scheduled).into_column(),
            ],
        )
    }

    fn set_preferred_name(&self, df: &mut DataFrame) -> Result<()> {
        let Some(preferred) = self
            .referrals
            .get_column_name(Column::StudentPreferredName)?
        else {
            debug!("no preferred name column configured");
            return Ok(());
        };
        let first = self.referrals.require_column_name(Column::StudentFirstName)?;
        let names: Vec<Option<String>> = column_strings(df.column(preferred)?)
            .into_iter()
            .zip(column_strings(df.column(first)?))
            .map(|(preferred, first)| preferred.or(first))
            .collect();
        df.with_column(Series::new(first.into(), names))?;
        Ok(())
    }

    fn merge_enrollment(&mut self, mut df: DataFrame) -> Result<DataFrame> {
        let Some(enrollment) = self.enrollment.as_mut() else {
            return Ok(df);
        };
        let referral_card = self.referrals.require_column_name(Column::StudentCardId)?;
        let enrollment_card = enrollment
            .require_column_name(Column::StudentCardId)?
            .to_string();
        if referral_card != enrollment_card {
            df.rename(referral_card, enrollment_card.as_str().into())?;
        }
        normalize_card_column(&mut df, &enrollment_card)?;

        let mut records = enrollment.data().clone();
        normalize_card_column(&mut records, &enrollment_card)?;
        enrollment.set_data(records);

        let merge_on = self.merge_on.as_deref().unwrap_or(&enrollment_card);
        let merged = df
            .lazy()
            .join(
                enrollment.data().clone().lazy(),
                [col(merge_on)],
                [col(merge_on)],
                join_args(JoinType::Left, MERGE_SUFFIX),
            )
            .collect()?;
        debug!(rows = merged.height(), merge_on, "merged enrollment records");
        Ok(merged)
    }

    fn remove_duplicates(&self, df: DataFrame) -> Result<DataFrame> {
        let Some(unique) = self.referrals.get_column_name(Column::UniqueReferral)? else {
            debug!("no unique referral column configured, keeping duplicate rows");
            return Ok(df);
        };
        let mut seen = BTreeSet::new();
        let keep: Vec<bool> = column_strings(df.column(unique)?)
            .into_iter()
            .map(|value| seen.insert(value))
            .collect();
        let deduped = filter_rows(&df, &keep)?;
        debug!(
            unique,
            removed = df.height() - deduped.height(),
            "removed duplicate referrals"
        );
        Ok(deduped)
    }
}

impl ReportAlgorithm for ReferralsReport {
    fn name(&self) -> &'static str {
        "referrals"
    }

    fn run(&mut self) -> Result<()> {
        if let Some(spec) = &self.complete_types {
            self.appointments.filter_appointment_type(spec)?;
        }
        if let Some(spec) = &self.valid_departments {
            self.referrals.filter_departments(spec)?;
        }
        self.referrals.coerce_dates()?;
        self.appointments.coerce_dates()?;

        let current = self.merge_appointments()?;
        let email = self.referrals.require_column_name(Column::StudentEmail)?;
        let remerged = self
            .referrals
            .data()
            .clone()
            .lazy()
            .join(
                current.lazy(),
                [col(email)],
                [col(email)],
                join_args(JoinType::Full, MERGE_SUFFIX),
            )
            .collect()?;
        debug!(rows = remerged.height(), "re-merged referrals");

        let mut results = self.add_flags(&remerged)?;
        self.set_preferred_name(&mut results)?;
        let results = self.merge_enrollment(results)?;
        let results = self.remove_duplicates(results)?;
        self.results = Some(results);
        Ok(())
    }

    fn results(&self) -> Result<&DataFrame> {
        computed(self.results.as_ref(), self.name())
    }
}
