//! Tests for reports configuration parsing.

use std::fs;
use std::path::PathBuf;

use hsr_cli::config::{ReportKind, ReportsConfig};
use serde_json::json;
use tempfile::TempDir;

fn parse(reports: serde_json::Value) -> ReportsConfig {
    ReportsConfig::parse(&json!({ "reports": reports }).to_string()).unwrap()
}

#[test]
fn followup_report_with_filters_and_period() {
    let config = parse(json!([{
        "type": "followup",
        "file_prefix": "followup_",
        "results_dir": "out",
        "require_followup": {"include": "^Career, Advising", "exclude": null},
        "valid_schools": {"include": ["Arts"]},
        "target_date_ranges": [["2024-01-01", "2024-06-01"]],
        "months": ["Jan-Mar"],
        "remove_cols": null
    }]));
    assert!(config.rejected.is_empty());
    let report = &config.reports[0];
    let ReportKind::Followup(params) = &report.kind else {
        panic!("expected followup report");
    };
    assert_eq!(params.require_followup.include_patterns(), ["^Career", "Advising"]);
    assert!(params.require_followup.exclude_patterns().is_empty());
    assert!(params.followup_types.is_none());
    assert_eq!(
        params.valid_schools.as_ref().map(|spec| spec.include_patterns().to_vec()),
        Some(vec!["Arts".to_string()])
    );

    let period = report.period.selection();
    assert_eq!(period.date_ranges.len(), 1);
    assert_eq!(period.months, Some(vec!["Jan-Mar".to_string()]));
    assert_eq!(period.years, None);

    let settings = report.output.settings();
    assert_eq!(settings.file_prefix, "followup_");
    assert_eq!(settings.results_dir, PathBuf::from("out"));
    assert!(settings.archive_dir.is_none());
    assert!(settings.remove_cols.is_empty());
    assert!(settings.final_cols.is_none());
}

#[test]
fn invalid_reports_are_skipped_and_siblings_kept() {
    let config = parse(json!([
        {
            "type": "followup",
            "file_prefix": "bad_pattern_",
            "results_dir": "out",
            "require_followup": {"include": ["(unclosed"]}
        },
        {
            "type": "survey_results",
            "file_prefix": "no_range_",
            "results_dir": "out",
            "survey_id": "survey"
        },
        {
            "type": "invoices",
            "file_prefix": "unknown_",
            "results_dir": "out"
        },
        {
            "type": "referrals",
            "file_prefix": "referrals_",
            "results_dir": "out",
            "archive_dir": "archive",
            "valid_appointments": {"include": ["Advising"]},
            "merge_enrollment": "Student ID",
            "rename_cols": {"Email": "Student Email"}
        }
    ]));

    let labels: Vec<&str> = config.rejected.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["#0 (bad_pattern_)", "#1 (no_range_)", "#2 (unknown_)"]
    );
    assert!(config.rejected[0].message.contains("(unclosed"));

    assert_eq!(config.reports.len(), 1);
    let report = &config.reports[0];
    assert_eq!(report.kind.name(), "referrals");
    let ReportKind::Referrals(params) = &report.kind else {
        panic!("expected referrals report");
    };
    assert_eq!(params.merge_enrollment.as_deref(), Some("Student ID"));
    assert!(params.valid_departments.is_none());
    let settings = report.output.settings();
    assert_eq!(settings.archive_dir, Some(PathBuf::from("archive")));
    assert_eq!(
        settings.rename_cols.get("Email").map(String::as_str),
        Some("Student Email")
    );
}

#[test]
fn survey_report_reads_tolerance_and_staff_filter() {
    let config = parse(json!([{
        "type": "survey_results",
        "file_prefix": "survey_",
        "results_dir": "out",
        "survey_id": "exit_survey",
        "day_range": 7,
        "emails": {"include": "pat@,lee@"},
        "years": ["2023-2024"]
    }]));
    let ReportKind::SurveyResults(params) = &config.reports[0].kind else {
        panic!("expected survey report");
    };
    assert_eq!(params.survey_id, "exit_survey");
    assert_eq!(params.day_range, 7);
    assert_eq!(
        params.emails.as_ref().map(|spec| spec.include_patterns().to_vec()),
        Some(vec!["pat@".to_string(), "lee@".to_string()])
    );
    assert_eq!(
        config.reports[0].period.selection().years,
        Some(vec!["2023-2024".to_string()])
    );
}

#[test]
fn reversed_date_range_rejects_report() {
    let config = parse(json!([{
        "type": "followup",
        "file_prefix": "followup_",
        "results_dir": "out",
        "require_followup": {"include": ["Advising"]},
        "target_date_ranges": [["2024-06-01", "2024-01-01"]]
    }]));
    assert!(config.reports.is_empty());
    assert_eq!(config.rejected.len(), 1);
}

#[test]
fn reads_config_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reports.config.json");
    fs::write(&path, r#"{"reports": []}"#).unwrap();
    let config = ReportsConfig::from_path(&path).unwrap();
    assert!(config.reports.is_empty());

    let missing = ReportsConfig::from_path(&dir.path().join("nope.json")).unwrap_err();
    assert!(format!("{missing:#}").contains("nope.json"));
}
