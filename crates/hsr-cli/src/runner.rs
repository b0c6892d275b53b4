//! Report fan-out and execution.
//!
//! Followup and survey reports run once per appointments dataset. Referral
//! reports run once per (referrals, appointments) pair and merge the first
//! enrollment dataset when one is loaded. Every run gets its own copies of
//! the datasets it uses, and a failing run never stops its siblings.

use std::path::PathBuf;

use hsr_dataset::ErrorKind;
use hsr_report::{
    FollowupReport, ReferralsReport, Report, ReportAlgorithm, ReportOutcome, SurveyResultsReport,
};
use tracing::{error, info_span, warn};

use crate::config::{ReportConfig, ReportKind};
use crate::datasets::DatasetStore;

/// What happened to one report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Written { rows: usize, output: Option<PathBuf> },
    Empty,
    Failed { kind: ErrorKind, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRun {
    pub label: String,
    pub kind: &'static str,
    pub status: RunStatus,
}

impl ReportRun {
    pub fn failed(&self) -> bool {
        matches!(self.status, RunStatus::Failed { .. })
    }
}

/// One report bound to the datasets it runs against.
struct Instance {
    dataset_ids: Vec<String>,
    algorithm: Result<Box<dyn ReportAlgorithm>, String>,
}

/// Runs every configured report against the loaded datasets, in order.
pub fn run_reports(reports: &[ReportConfig], store: &DatasetStore, dry_run: bool) -> Vec<ReportRun> {
    let mut runs = Vec::new();
    for config in reports {
        let instances = instances(config, store);
        if instances.is_empty() {
            warn!(
                report = %config.output.file_prefix,
                kind = config.kind.name(),
                "no loaded datasets for report"
            );
        }
        let fan_out = instances.len() > 1;
        for instance in instances {
            runs.push(run_instance(config, instance, fan_out, dry_run));
        }
    }
    runs
}

fn instances(config: &ReportConfig, store: &DatasetStore) -> Vec<Instance> {
    match &config.kind {
        ReportKind::Followup(params) => store
            .appointments()
            .map(|appointments| {
                let mut report = FollowupReport::new(
                    appointments.deep_copy(),
                    params.require_followup.clone(),
                )
                .with_period(config.period.selection());
                if let Some(types) = &params.followup_types {
                    report = report.with_followup_types(types.clone());
                }
                if let Some(schools) = &params.valid_schools {
                    report = report.with_schools(schools.clone());
                }
                let algorithm: Box<dyn ReportAlgorithm> = Box::new(report);
                Instance {
                    dataset_ids: vec![appointments.id().to_string()],
                    algorithm: Ok(algorithm),
                }
            })
            .collect(),
        ReportKind::Referrals(params) => {
            let enrollment = store.enrollment().next();
            let mut instances = Vec::new();
            for referrals in store.referrals() {
                for appointments in store.appointments() {
                    let mut report =
                        ReferralsReport::new(referrals.deep_copy(), appointments.deep_copy());
                    if let Some(types) = &params.valid_appointments {
                        report = report.with_complete_types(types.clone());
                    }
                    if let Some(departments) = &params.valid_departments {
                        report = report.with_departments(departments.clone());
                    }
                    if let Some(enrollment) = enrollment {
                        report = report
                            .with_enrollment(enrollment.deep_copy(), params.merge_enrollment.clone());
                    }
                    let algorithm: Box<dyn ReportAlgorithm> = Box::new(report);
                    instances.push(Instance {
                        dataset_ids: vec![referrals.id().to_string(), appointments.id().to_string()],
                        algorithm: Ok(algorithm),
                    });
                }
            }
            instances
        }
        ReportKind::SurveyResults(params) => store
            .appointments()
            .map(|appointments| {
                let algorithm = match store.survey(&params.survey_id) {
                    Some(surveys) => {
                        let mut report = SurveyResultsReport::new(
                            appointments.deep_copy(),
                            surveys.deep_copy(),
                            params.day_range,
                        )
                        .with_period(config.period.selection());
                        if let Some(emails) = &params.emails {
                            report = report.with_staff_emails(emails.clone());
                        }
                        let algorithm: Box<dyn ReportAlgorithm> = Box::new(report);
                        Ok(algorithm)
                    }
                    None => Err(format!(
                        "survey dataset '{}' is not loaded",
                        params.survey_id
                    )),
                };
                Instance {
                    dataset_ids: vec![appointments.id().to_string()],
                    algorithm,
                }
            })
            .collect(),
    }
}

fn run_instance(config: &ReportConfig, instance: Instance, fan_out: bool, dry_run: bool) -> ReportRun {
    let kind = config.kind.name();
    let label = format!(
        "{}{}",
        config.output.file_prefix,
        instance.dataset_ids.join("+")
    );
    let span = info_span!("report", report = %label, kind);
    let _guard = span.enter();

    let status = match instance.algorithm {
        Err(message) => {
            error!(error = %message, "report could not be built");
            RunStatus::Failed {
                kind: ErrorKind::Configuration,
                message,
            }
        }
        Ok(algorithm) => {
            let mut settings = config.output.settings();
            // Runs sharing a config would otherwise write to the same file name.
            if fan_out {
                settings.file_prefix =
                    format!("{}{}_", settings.file_prefix, instance.dataset_ids.join("_"));
            }
            let mut report = Report::new(label.clone(), algorithm, settings).with_dry_run(dry_run);
            match report.run() {
                Ok(ReportOutcome::Written { rows, output, .. }) => RunStatus::Written { rows, output },
                Ok(ReportOutcome::Empty) => RunStatus::Empty,
                Err(err) => {
                    error!(kind = %err.kind(), error = %err, "report failed");
                    RunStatus::Failed {
                        kind: err.kind(),
                        message: err.to_string(),
                    }
                }
            }
        }
    };
    ReportRun {
        label,
        kind,
        status,
    }
}
