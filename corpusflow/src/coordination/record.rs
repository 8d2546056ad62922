//! Completion records: the only thing one stage tells the next.

use crate::core::ItemStatus;
use crate::utils::timestamps::{self, Timestamp};
use serde::{Deserialize, Serialize};

/// Anything that reports a per-item outcome inside a completion record.
pub trait ItemOutcome {
    /// Returns the item's status.
    fn status(&self) -> ItemStatus;

    /// Returns true if the item produced an artifact.
    fn is_success(&self) -> bool {
        self.status().is_success()
    }
}

/// Record a stage writes once, after every item has been handled.
///
/// `results` keeps processing order. Counts always satisfy
/// `items_succeeded + items_failed == items_total` for records built with
/// [`StageCompletionRecord::from_results`]; the legacy field names
/// `files_processed`, `successful` and `failed` are accepted on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageCompletionRecord<T> {
    /// When the stage finished. Unreadable values fall back to the epoch.
    #[serde(default, with = "timestamps::lenient")]
    pub timestamp: Timestamp,
    /// Number of items handled.
    #[serde(default, alias = "files_processed")]
    pub items_total: usize,
    /// Items with `status = success`.
    #[serde(default, alias = "successful")]
    pub items_succeeded: usize,
    /// Items with `status = failed`.
    #[serde(default, alias = "failed")]
    pub items_failed: usize,
    /// Per-item outcomes in processing order.
    pub results: Vec<T>,
}

impl<T: ItemOutcome> StageCompletionRecord<T> {
    /// Builds a record stamped now, deriving every count from `results`.
    #[must_use]
    pub fn from_results(results: Vec<T>) -> Self {
        let items_succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            timestamp: timestamps::now_utc(),
            items_total: results.len(),
            items_succeeded,
            items_failed: results.len() - items_succeeded,
            results,
        }
    }

    /// Iterates over successful items in record order.
    pub fn successes(&self) -> impl Iterator<Item = &T> {
        self.results.iter().filter(|r| r.is_success())
    }

    /// Returns true if the stored counts agree with `results`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let succeeded = self.successes().count();
        self.items_total == self.results.len()
            && self.items_succeeded == succeeded
            && self.items_failed == self.results.len() - succeeded
    }
}

/// One entry of the fetch stage's record. Extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchItem {
    /// Raw document name inside the raw directory.
    pub file: String,
    /// Fetch outcome.
    pub status: ItemStatus,
}

impl FetchItem {
    /// Creates a fetch item.
    #[must_use]
    pub fn new(file: impl Into<String>, status: ItemStatus) -> Self {
        Self {
            file: file.into(),
            status,
        }
    }
}

impl ItemOutcome for FetchItem {
    fn status(&self) -> ItemStatus {
        self.status
    }
}

/// Counts carried by a successful [`ProcessItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCounts {
    /// Whitespace-delimited words in the cleaned text.
    pub word_count: usize,
    /// Extracted `href` values.
    pub link_count: usize,
    /// Extracted `src` values.
    pub image_count: usize,
}

/// One entry of the processor's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessItem {
    /// Raw document the item came from.
    pub source_file: String,
    /// Processed document name (present even on failure).
    pub output_file: String,
    /// Processing outcome.
    pub status: ItemStatus,
    /// Counts, present only on success.
    #[serde(flatten)]
    pub counts: Option<DocumentCounts>,
}

impl ProcessItem {
    /// Creates a successful item.
    #[must_use]
    pub fn success(
        source_file: impl Into<String>,
        output_file: impl Into<String>,
        counts: DocumentCounts,
    ) -> Self {
        Self {
            source_file: source_file.into(),
            output_file: output_file.into(),
            status: ItemStatus::Success,
            counts: Some(counts),
        }
    }

    /// Creates a failed item.
    #[must_use]
    pub fn failed(source_file: impl Into<String>, output_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            output_file: output_file.into(),
            status: ItemStatus::Failed,
            counts: None,
        }
    }
}

impl ItemOutcome for ProcessItem {
    fn status(&self) -> ItemStatus {
        self.status
    }
}

/// Completion record of the fetch stage.
pub type FetchRecord = StageCompletionRecord<FetchItem>;

/// Completion record of the process stage.
pub type ProcessRecord = StageCompletionRecord<ProcessItem>;
