//! Where each stage reads and writes inside the shared storage area.

use crate::core::StageKind;
use crate::errors::ItemError;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Directory and file names under the shared storage root.
///
/// Relative entries are resolved against `root`; absolute entries are used
/// as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLayout {
    /// Shared storage root.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Raw documents written by the fetch stage.
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,
    /// Processed documents written by the processor.
    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,
    /// Final report written by the analyzer.
    #[serde(default = "default_analysis_dir")]
    pub analysis_dir: PathBuf,
    /// Completion records of every stage.
    #[serde(default = "default_status_dir")]
    pub status_dir: PathBuf,
    /// File name of the fetch completion record.
    #[serde(default = "default_fetch_record")]
    pub fetch_record: String,
    /// File name of the process completion record.
    #[serde(default = "default_process_record")]
    pub process_record: String,
    /// File name of the final report.
    #[serde(default = "default_report")]
    pub report: String,
}

fn default_root() -> PathBuf {
    PathBuf::from("/shared")
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("raw")
}

fn default_processed_dir() -> PathBuf {
    PathBuf::from("processed")
}

fn default_analysis_dir() -> PathBuf {
    PathBuf::from("analysis")
}

fn default_status_dir() -> PathBuf {
    PathBuf::from("status")
}

fn default_fetch_record() -> String {
    "fetch_complete.json".to_string()
}

fn default_process_record() -> String {
    "process_complete.json".to_string()
}

fn default_report() -> String {
    "final_report.json".to_string()
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self {
            root: default_root(),
            raw_dir: default_raw_dir(),
            processed_dir: default_processed_dir(),
            analysis_dir: default_analysis_dir(),
            status_dir: default_status_dir(),
            fetch_record: default_fetch_record(),
            process_record: default_process_record(),
            report: default_report(),
        }
    }
}

impl StorageLayout {
    /// Creates the default layout under `root`.
    #[must_use]
    pub fn under(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Directory of raw documents.
    #[must_use]
    pub fn raw_dir(&self) -> PathBuf {
        self.root.join(&self.raw_dir)
    }

    /// Directory of processed documents.
    #[must_use]
    pub fn processed_dir(&self) -> PathBuf {
        self.root.join(&self.processed_dir)
    }

    /// Directory of the final report.
    #[must_use]
    pub fn analysis_dir(&self) -> PathBuf {
        self.root.join(&self.analysis_dir)
    }

    /// Directory of completion records.
    #[must_use]
    pub fn status_dir(&self) -> PathBuf {
        self.root.join(&self.status_dir)
    }

    /// Path of the fetch completion record.
    #[must_use]
    pub fn fetch_record_path(&self) -> PathBuf {
        self.status_dir().join(&self.fetch_record)
    }

    /// Path of the process completion record.
    #[must_use]
    pub fn process_record_path(&self) -> PathBuf {
        self.status_dir().join(&self.process_record)
    }

    /// Path of the final corpus report.
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.analysis_dir().join(&self.report)
    }

    /// Directories `stage` writes into and must create at startup.
    #[must_use]
    pub fn output_dirs(&self, stage: StageKind) -> Vec<PathBuf> {
        match stage {
            StageKind::Fetch => vec![self.raw_dir(), self.status_dir()],
            StageKind::Process => vec![self.processed_dir(), self.status_dir()],
            StageKind::Analyze => vec![self.analysis_dir(), self.status_dir()],
        }
    }

    /// Resolves a raw document named in the fetch record.
    pub fn raw_document(&self, file: &str) -> Result<PathBuf, ItemError> {
        Ok(self.raw_dir().join(plain_file_name(file)?))
    }

    /// Resolves a processed document named in the process record.
    pub fn processed_document(&self, output_file: &str) -> Result<PathBuf, ItemError> {
        Ok(self.processed_dir().join(plain_file_name(output_file)?))
    }
}

/// Derives the processed-document name for a raw document: same stem, `.json`.
#[must_use]
pub fn processed_name(source_file: &str) -> String {
    Path::new(source_file)
        .with_extension("json")
        .to_string_lossy()
        .into_owned()
}

fn plain_file_name(name: &str) -> Result<&Path, ItemError> {
    let path = Path::new(name);
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(path),
        _ => Err(ItemError::InvalidName(name.to_string())),
    }
}
