//! Logical column registry.
//!
//! Source exports name their headers however the scheduling platform (or
//! whoever exported the file) felt like that day. Reports never use those
//! headers directly: they ask for a [`Column`], and each loaded dataset carries
//! a [`ColumnMap`] from logical columns to the physical headers of its table.
//!
//! Which logical columns a dataset may map is fixed per [`DatasetKind`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic column names shared by every dataset kind.
///
/// The serialized names are the keys used in the files configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "staff_email")]
    StaffEmail,
    #[serde(rename = "type")]
    AppointmentType,
    #[serde(rename = "stu_email")]
    StudentEmail,
    #[serde(rename = "college")]
    StudentCollege,
    #[serde(rename = "major")]
    StudentMajor,
    #[serde(rename = "class")]
    StudentClass,
    #[serde(rename = "card_id")]
    StudentCardId,
    #[serde(rename = "fname")]
    StudentFirstName,
    #[serde(rename = "pref_name")]
    StudentPreferredName,
    #[serde(rename = "lname")]
    StudentLastName,
    #[serde(rename = "status")]
    Status,
    #[serde(rename = "date_scheduled")]
    DateScheduled,
    #[serde(rename = "unique_referral")]
    UniqueReferral,
    #[serde(rename = "referring_department")]
    ReferringDepartment,
}

impl Column {
    /// Configuration key for this column.
    pub fn key(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Date => "date",
            Self::StaffEmail => "staff_email",
            Self::AppointmentType => "type",
            Self::StudentEmail => "stu_email",
            Self::StudentCollege => "college",
            Self::StudentMajor => "major",
            Self::StudentClass => "class",
            Self::StudentCardId => "card_id",
            Self::StudentFirstName => "fname",
            Self::StudentPreferredName => "pref_name",
            Self::StudentLastName => "lname",
            Self::Status => "status",
            Self::DateScheduled => "date_scheduled",
            Self::UniqueReferral => "unique_referral",
            Self::ReferringDepartment => "referring_department",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Mapping from logical columns to the physical headers of one table.
pub type ColumnMap = BTreeMap<Column, String>;

/// Dataset kinds as named in the files configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KindName {
    #[serde(rename = "appointments")]
    Appointments,
    #[serde(rename = "enrollment")]
    Enrollment,
    #[serde(rename = "referral")]
    Referrals,
    #[serde(rename = "survey_results")]
    Surveys,
}

impl KindName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Appointments => "appointments",
            Self::Enrollment => "enrollment",
            Self::Referrals => "referral",
            Self::Surveys => "survey_results",
        }
    }
}

impl fmt::Display for KindName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A kind of source export with a closed set of logical columns.
///
/// Implementors are zero-sized markers used as the type parameter of a
/// dataset, so a report that needs appointments cannot be handed referrals.
pub trait DatasetKind: Clone + fmt::Debug + Send + Sync + 'static {
    /// Configuration name of the kind.
    const NAME: KindName;

    /// Logical columns a dataset of this kind may map.
    const COLUMNS: &'static [Column];

    /// Returns true if `column` belongs to this kind.
    fn declares(column: Column) -> bool {
        Self::COLUMNS.contains(&column)
    }
}

/// Appointment exports.
#[derive(Debug, Clone, Copy, Default)]
pub struct Appointments;

/// Enrollment (student record) exports.
#[derive(Debug, Clone, Copy, Default)]
pub struct Enrollment;

/// Referral exports.
#[derive(Debug, Clone, Copy, Default)]
pub struct Referrals;

/// Post-appointment survey exports.
#[derive(Debug, Clone, Copy, Default)]
pub struct Surveys;

impl DatasetKind for Appointments {
    const NAME: KindName = KindName::Appointments;
    const COLUMNS: &'static [Column] = &[
        Column::Id,
        Column::Date,
        Column::StaffEmail,
        Column::AppointmentType,
        Column::StudentEmail,
        Column::StudentCollege,
        Column::StudentMajor,
        Column::StudentClass,
        Column::StudentCardId,
        Column::StudentFirstName,
        Column::StudentPreferredName,
        Column::StudentLastName,
        Column::Status,
        Column::DateScheduled,
    ];
}

impl DatasetKind for Enrollment {
    const NAME: KindName = KindName::Enrollment;
    const COLUMNS: &'static [Column] = &[Column::Id, Column::Date, Column::StudentCardId];
}

impl DatasetKind for Referrals {
    const NAME: KindName = KindName::Referrals;
    const COLUMNS: &'static [Column] = &[
        Column::Id,
        Column::Date,
        Column::StaffEmail,
        Column::StudentEmail,
        Column::StudentCollege,
        Column::StudentMajor,
        Column::StudentClass,
        Column::StudentCardId,
        Column::StudentFirstName,
        Column::StudentPreferredName,
        Column::StudentLastName,
        Column::UniqueReferral,
        Column::ReferringDepartment,
    ];
}

impl DatasetKind for Surveys {
    const NAME: KindName = KindName::Surveys;
    const COLUMNS: &'static [Column] = &[
        Column::Id,
        Column::Date,
        Column::StudentEmail,
        Column::StudentFirstName,
        Column::StudentLastName,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_serde_names() {
        for column in Appointments::COLUMNS
            .iter()
            .chain(Referrals::COLUMNS)
            .copied()
        {
            let json = serde_json::to_string(&column).unwrap();
            assert_eq!(json, format!("\"{}\"", column.key()));
        }
    }

    #[test]
    fn kinds_declare_their_own_columns() {
        assert!(Appointments::declares(Column::Status));
        assert!(!Surveys::declares(Column::Status));
        assert!(Referrals::declares(Column::UniqueReferral));
        assert!(!Appointments::declares(Column::UniqueReferral));
        assert!(Enrollment::declares(Column::StudentCardId));
    }
}
