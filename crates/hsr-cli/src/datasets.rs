//! Loading configured exports into typed datasets.

use anyhow::{Context, Result};
use hsr_dataset::Dataset;
use hsr_ingest::{most_recent_file, read_csv_frame};
use hsr_model::{Appointments, ColumnMap, Enrollment, KindName, Referrals, Surveys};
use tracing::{error, info, info_span};

use crate::config::{FileEntry, Rejected};

/// A dataset of any configured kind.
#[derive(Debug, Clone)]
pub enum LoadedDataset {
    Appointments(Dataset<Appointments>),
    Enrollment(Dataset<Enrollment>),
    Referrals(Dataset<Referrals>),
    Surveys(Dataset<Surveys>),
}

impl LoadedDataset {
    pub fn id(&self) -> &str {
        match self {
            Self::Appointments(dataset) => dataset.id(),
            Self::Enrollment(dataset) => dataset.id(),
            Self::Referrals(dataset) => dataset.id(),
            Self::Surveys(dataset) => dataset.id(),
        }
    }

    pub fn kind(&self) -> KindName {
        match self {
            Self::Appointments(dataset) => dataset.kind(),
            Self::Enrollment(dataset) => dataset.kind(),
            Self::Referrals(dataset) => dataset.kind(),
            Self::Surveys(dataset) => dataset.kind(),
        }
    }

    pub fn height(&self) -> usize {
        match self {
            Self::Appointments(dataset) => dataset.height(),
            Self::Enrollment(dataset) => dataset.height(),
            Self::Referrals(dataset) => dataset.height(),
            Self::Surveys(dataset) => dataset.height(),
        }
    }

    pub fn columns(&self) -> &ColumnMap {
        match self {
            Self::Appointments(dataset) => dataset.columns(),
            Self::Enrollment(dataset) => dataset.columns(),
            Self::Referrals(dataset) => dataset.columns(),
            Self::Surveys(dataset) => dataset.columns(),
        }
    }
}

/// Loads the most recent matching export for one file entry.
pub fn load_entry(entry: &FileEntry) -> Result<LoadedDataset> {
    let path = most_recent_file(&entry.dir, &entry.must_contain)?;
    let data = read_csv_frame(&path, &entry.aliases())
        .with_context(|| format!("load {}", path.display()))?;
    let id = entry.id.clone();
    let columns = entry.column_map();
    let dataset = match entry.kind {
        KindName::Appointments => LoadedDataset::Appointments(Dataset::new(id, data, columns)?),
        KindName::Enrollment => LoadedDataset::Enrollment(Dataset::new(id, data, columns)?),
        KindName::Referrals => LoadedDataset::Referrals(Dataset::new(id, data, columns)?),
        KindName::Surveys => LoadedDataset::Surveys(Dataset::new(id, data, columns)?),
    };
    info!(
        dataset = %entry.id,
        kind = %entry.kind,
        rows = dataset.height(),
        path = %path.display(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Every dataset that loaded successfully, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    datasets: Vec<LoadedDataset>,
}

impl DatasetStore {
    /// Loads each entry; failures are logged and returned alongside the store.
    pub fn load(entries: &[FileEntry]) -> (Self, Vec<Rejected>) {
        let span = info_span!("load_datasets", entries = entries.len());
        let _guard = span.enter();
        let mut store = Self::default();
        let mut rejected = Vec::new();
        for entry in entries {
            match load_entry(entry) {
                Ok(dataset) => store.push(dataset),
                Err(err) => {
                    let message = format!("{err:#}");
                    error!(dataset = %entry.id, error = %message, "skipping dataset");
                    rejected.push(Rejected {
                        label: entry.id.clone(),
                        message,
                    });
                }
            }
        }
        (store, rejected)
    }

    pub fn push(&mut self, dataset: LoadedDataset) {
        self.datasets.push(dataset);
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadedDataset> {
        self.datasets.iter()
    }

    pub fn appointments(&self) -> impl Iterator<Item = &Dataset<Appointments>> {
        self.datasets.iter().filter_map(|dataset| match dataset {
            LoadedDataset::Appointments(inner) => Some(inner),
            _ => None,
        })
    }

    pub fn enrollment(&self) -> impl Iterator<Item = &Dataset<Enrollment>> {
        self.datasets.iter().filter_map(|dataset| match dataset {
            LoadedDataset::Enrollment(inner) => Some(inner),
            _ => None,
        })
    }

    pub fn referrals(&self) -> impl Iterator<Item = &Dataset<Referrals>> {
        self.datasets.iter().filter_map(|dataset| match dataset {
            LoadedDataset::Referrals(inner) => Some(inner),
            _ => None,
        })
    }

    pub fn surveys(&self) -> impl Iterator<Item = &Dataset<Surveys>> {
        self.datasets.iter().filter_map(|dataset| match dataset {
            LoadedDataset::Surveys(inner) => Some(inner),
            _ => None,
        })
    }

    /// Survey dataset with the given id.
    pub fn survey(&self, id: &str) -> Option<&Dataset<Surveys>> {
        self.surveys().find(|dataset| dataset.id() == id)
    }
}
