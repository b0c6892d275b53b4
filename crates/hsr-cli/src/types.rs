use hsr_cli::config::Rejected;
use hsr_cli::datasets::DatasetStore;
use hsr_cli::runner::ReportRun;

#[derive(Debug)]
pub struct RunSummary {
    pub datasets: usize,
    pub runs: Vec<ReportRun>,
    pub skipped_files: Vec<Rejected>,
    pub skipped_reports: Vec<Rejected>,
    pub dry_run: bool,
}

impl RunSummary {
    /// A failed run or a rejected report configuration.
    pub fn has_errors(&self) -> bool {
        !self.skipped_reports.is_empty() || self.runs.iter().any(ReportRun::failed)
    }
}

#[derive(Debug)]
pub struct DatasetsSummary {
    pub store: DatasetStore,
    pub skipped_files: Vec<Rejected>,
}
