use anyhow::Result;
use tracing::{info, info_span};

use hsr_cli::config::{FilesConfig, ReportsConfig};
use hsr_cli::datasets::DatasetStore;
use hsr_cli::runner::run_reports;

use crate::cli::{DatasetsArgs, RunArgs};
use crate::types::{DatasetsSummary, RunSummary};

pub fn run(args: &RunArgs) -> Result<RunSummary> {
    let span = info_span!("run", dry_run = args.dry_run);
    let _guard = span.enter();
    let files = FilesConfig::from_path(&args.files_config)?;
    let reports = ReportsConfig::from_path(&args.reports_config)?;

    let (store, load_failures) = DatasetStore::load(&files.files);
    let mut skipped_files = files.rejected;
    skipped_files.extend(load_failures);
    info!(
        datasets = store.len(),
        reports = reports.reports.len(),
        "configuration loaded"
    );

    let runs = run_reports(&reports.reports, &store, args.dry_run);
    Ok(RunSummary {
        datasets: store.len(),
        runs,
        skipped_files,
        skipped_reports: reports.rejected,
        dry_run: args.dry_run,
    })
}

pub fn datasets(args: &DatasetsArgs) -> Result<DatasetsSummary> {
    let files = FilesConfig::from_path(&args.files_config)?;
    let (store, load_failures) = DatasetStore::load(&files.files);
    let mut skipped_files = files.rejected;
    skipped_files.extend(load_failures);
    Ok(DatasetsSummary {
        store,
        skipped_files,
    })
}
