//! Files and reports configuration.
//!
//! Both files hold a list of entries. Entries are parsed one at a time so a
//! malformed entry is logged and skipped without discarding its siblings.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hsr_model::{Column, DateRange, FilterConfig, FilterSpec, KindName};
use hsr_report::{OutputSettings, PeriodSelection};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, error};

pub const DEFAULT_FILES_CONFIG: &str = "files.config.json";
pub const DEFAULT_REPORTS_CONFIG: &str = "reports.config.json";

/// A configuration entry that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub label: String,
    pub message: String,
}

#[derive(Deserialize)]
struct RawFiles {
    files: Vec<Value>,
}

#[derive(Deserialize)]
struct RawReports {
    reports: Vec<Value>,
}

/// Header for one logical column; `map` is a source header renamed on load.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnName {
    pub name: String,
    #[serde(default)]
    pub map: Option<String>,
}

/// One CSV export to load.
#[derive(Debug, Clone, Deserialize)]
pub struct FileEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: KindName,
    pub dir: PathBuf,
    #[serde(default)]
    pub must_contain: String,
    #[serde(default)]
    pub column_names: BTreeMap<Column, ColumnName>,
}

impl FileEntry {
    /// Source header → configured header, for columns with a `map`.
    pub fn aliases(&self) -> BTreeMap<String, String> {
        self.column_names
            .values()
            .filter_map(|column| {
                column
                    .map
                    .as_ref()
                    .map(|source| (source.clone(), column.name.clone()))
            })
            .collect()
    }

    /// Logical column → configured header.
    pub fn column_map(&self) -> BTreeMap<Column, String> {
        self.column_names
            .iter()
            .map(|(column, names)| (*column, names.name.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilesConfig {
    pub files: Vec<FileEntry>,
    pub rejected: Vec<Rejected>,
}

impl FilesConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = read_config(path)?;
        Self::parse(&text).with_context(|| format!("parse files config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let raw: RawFiles = serde_json::from_str(text)?;
        let mut config = Self::default();
        for (index, value) in raw.files.into_iter().enumerate() {
            let label = entry_label(&value, "id", index);
            match FileEntry::deserialize(value) {
                Ok(entry) => config.files.push(entry),
                Err(err) => {
                    error!(entry = %label, error = %err, "skipping invalid file entry");
                    config.rejected.push(Rejected {
                        label,
                        message: err.to_string(),
                    });
                }
            }
        }
        debug!(files = config.files.len(), "loaded files config");
        Ok(config)
    }
}

/// Output location and column shaping shared by every report type.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub file_prefix: String,
    pub results_dir: PathBuf,
    #[serde(default)]
    pub archive_dir: Option<PathBuf>,
    #[serde(default)]
    pub remove_cols: Option<Vec<String>>,
    #[serde(default)]
    pub rename_cols: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub final_cols: Option<Vec<String>>,
}

impl OutputConfig {
    pub fn settings(&self) -> OutputSettings {
        OutputSettings {
            file_prefix: self.file_prefix.clone(),
            results_dir: self.results_dir.clone(),
            archive_dir: self.archive_dir.clone(),
            remove_cols: self.remove_cols.clone().unwrap_or_default(),
            rename_cols: self.rename_cols.clone().unwrap_or_default(),
            final_cols: self.final_cols.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeriodConfig {
    #[serde(default)]
    pub target_date_ranges: Option<Vec<DateRange>>,
    #[serde(default)]
    pub years: Option<Vec<String>>,
    #[serde(default)]
    pub months: Option<Vec<String>>,
}

impl PeriodConfig {
    pub fn selection(&self) -> PeriodSelection {
        PeriodSelection {
            date_ranges: self.target_date_ranges.clone().unwrap_or_default(),
            years: self.years.clone(),
            months: self.months.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowupConfig {
    #[serde(deserialize_with = "filter")]
    pub require_followup: FilterSpec,
    #[serde(default, deserialize_with = "optional_filter")]
    pub followup_types: Option<FilterSpec>,
    #[serde(default, deserialize_with = "optional_filter")]
    pub valid_schools: Option<FilterSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferralsConfig {
    #[serde(default, deserialize_with = "optional_filter")]
    pub valid_appointments: Option<FilterSpec>,
    #[serde(default, deserialize_with = "optional_filter")]
    pub valid_departments: Option<FilterSpec>,
    #[serde(default)]
    pub merge_enrollment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SurveyResultsConfig {
    pub survey_id: String,
    pub day_range: u32,
    #[serde(default, deserialize_with = "optional_filter")]
    pub emails: Option<FilterSpec>,
}

/// Report type and its type-specific parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportKind {
    Followup(FollowupConfig),
    Referrals(ReferralsConfig),
    SurveyResults(SurveyResultsConfig),
}

impl ReportKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Followup(_) => "followup",
            Self::Referrals(_) => "referrals",
            Self::SurveyResults(_) => "survey_results",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub output: OutputConfig,
    pub period: PeriodConfig,
    pub kind: ReportKind,
}

impl ReportConfig {
    /// Parses one report object. Filters are compiled here, so an invalid
    /// pattern rejects the report.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let output = OutputConfig::deserialize(&value)?;
        let period = PeriodConfig::deserialize(&value)?;
        let kind = ReportKind::deserialize(value)?;
        Ok(Self {
            output,
            period,
            kind,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportsConfig {
    pub reports: Vec<ReportConfig>,
    pub rejected: Vec<Rejected>,
}

impl ReportsConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = read_config(path)?;
        Self::parse(&text).with_context(|| format!("parse reports config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let raw: RawReports = serde_json::from_str(text)?;
        let mut config = Self::default();
        for (index, value) in raw.reports.into_iter().enumerate() {
            let label = entry_label(&value, "file_prefix", index);
            match ReportConfig::from_value(value) {
                Ok(report) => config.reports.push(report),
                Err(err) => {
                    error!(report = %label, error = %err, "skipping invalid report");
                    config.rejected.push(Rejected {
                        label,
                        message: err.to_string(),
                    });
                }
            }
        }
        debug!(reports = config.reports.len(), "loaded reports config");
        Ok(config)
    }
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))
}

fn entry_label(value: &Value, key: &str, index: usize) -> String {
    match value.get(key).and_then(Value::as_str) {
        Some(name) => format!("#{index} ({name})"),
        None => format!("#{index}"),
    }
}

fn filter<'de, D>(deserializer: D) -> Result<FilterSpec, D::Error>
where
    D: Deserializer<'de>,
{
    let config = FilterConfig::deserialize(deserializer)?;
    FilterSpec::try_from(config).map_err(D::Error::custom)
}

fn optional_filter<'de, D>(deserializer: D) -> Result<Option<FilterSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<FilterConfig>::deserialize(deserializer)?
        .map(FilterSpec::try_from)
        .transpose()
        .map_err(D::Error::custom)
}
