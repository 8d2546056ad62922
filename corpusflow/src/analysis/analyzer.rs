//! The corpus analyzer stage.

use super::corpus::{analyze_corpus, CorpusDocument};
use super::report::CorpusAnalysis;
use crate::cancellation::CancellationToken;
use crate::config::{AnalysisConfig, PipelineConfig};
use crate::coordination::{CompletionWaiter, PollingWaiter, ProcessItem, StorageLayout};
use crate::core::{StageKind, StageOutcome};
use crate::errors::{CorpusflowError, ItemError, Result};
use crate::stages::Stage;
use crate::storage::{read_json, write_json, Storage};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// The part of a processed document the analyzer reads.
#[derive(Deserialize)]
struct StoredText {
    #[serde(default)]
    text: String,
}

/// Reads the process record and writes the final corpus report.
pub struct CorpusAnalyzer {
    storage: Arc<dyn Storage>,
    layout: StorageLayout,
    waiter: Arc<dyn CompletionWaiter<ProcessItem>>,
    config: AnalysisConfig,
    concurrency: usize,
}

impl CorpusAnalyzer {
    /// Creates an analyzer that takes its upstream record from `waiter`.
    pub fn new(
        storage: Arc<dyn Storage>,
        layout: StorageLayout,
        waiter: Arc<dyn CompletionWaiter<ProcessItem>>,
    ) -> Self {
        Self {
            storage,
            layout,
            waiter,
            config: AnalysisConfig::default(),
            concurrency: 4,
        }
    }

    /// Creates an analyzer that polls storage for the process record.
    pub fn polling(storage: Arc<dyn Storage>, config: &PipelineConfig) -> Self {
        let waiter = PollingWaiter::new(
            Arc::clone(&storage),
            config.storage.process_record_path(),
            StageKind::Process,
            config.poll.clone(),
        );
        Self::new(storage, config.storage.clone(), Arc::new(waiter))
            .with_config(config.analysis.clone())
            .with_concurrency(config.processing.concurrency)
    }

    /// Sets ranking sizes.
    #[must_use]
    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets how many documents load at once.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Waits for the processor, then analyzes every successfully processed
    /// document.
    ///
    /// Returns [`StageOutcome::NothingToDo`] without writing a report when the
    /// processor succeeded on nothing. Documents that fail to load are logged
    /// and left out of every aggregate.
    pub async fn analyze(&self, cancel: &CancellationToken) -> Result<StageOutcome> {
        for dir in self.layout.output_dirs(StageKind::Analyze) {
            self.storage.create_dir_all(&dir)?;
        }

        let record = self.waiter.wait(cancel).await?;
        if !record.is_consistent() {
            warn!(
                items_total = record.items_total,
                items_succeeded = record.items_succeeded,
                items_failed = record.items_failed,
                "Process record counts do not add up, using its results list"
            );
        }

        let items: Vec<ProcessItem> = record.successes().cloned().collect();
        if items.is_empty() {
            info!("No successful files to analyze");
            return Ok(StageOutcome::NothingToDo);
        }

        info!(documents = items.len(), "Analyzing {} documents...", items.len());
        let attempted = items.len();
        let documents = self.load_documents(items).await;
        let failed = attempted - documents.len();

        let config = self.config.clone();
        let report = tokio::task::spawn_blocking(move || analyze_corpus(&documents, &config))
            .await
            .map_err(|e| CorpusflowError::Internal(format!("corpus analysis did not finish: {e}")))?;

        self.write_report(&report)?;
        Ok(StageOutcome::completed(report.documents_processed, failed))
    }

    /// Loads documents in record order, `concurrency` at a time.
    async fn load_documents(&self, items: Vec<ProcessItem>) -> Vec<CorpusDocument> {
        let loads = items.into_iter().map(|item| {
            let storage = Arc::clone(&self.storage);
            let path = self.layout.processed_document(&item.output_file);
            async move {
                let name = item.output_file;
                let loaded = match path {
                    Ok(path) => tokio::task::spawn_blocking(move || {
                        load_text(storage.as_ref(), &path)
                    })
                    .await
                    .unwrap_or_else(|e| Err(ItemError::Worker(name.clone(), e.to_string()))),
                    Err(e) => Err(e),
                };
                (name, loaded)
            }
        });

        stream::iter(loads)
            .buffered(self.concurrency)
            .filter_map(|(name, loaded)| async move {
                match loaded {
                    Ok(text) => Some(CorpusDocument::new(name, text)),
                    Err(e) => {
                        warn!(output_file = %name, error = %e, "Error reading {name}, skipping");
                        None
                    }
                }
            })
            .collect()
            .await
    }

    fn write_report(&self, report: &CorpusAnalysis) -> Result<()> {
        let path = self.layout.report_path();
        write_json(self.storage.as_ref(), &path, report)
            .map_err(|e| e.into_stage_error(&path))?;

        info!(path = %path.display(), "Analysis complete! Report saved to {}", path.display());
        info!(
            documents_processed = report.documents_processed,
            total_words = report.total_words,
            unique_words = report.unique_words,
            pairs_compared = report.document_similarity.len(),
            complexity_score = report.readability.complexity_score,
            "Analysis summary"
        );
        Ok(())
    }
}

fn load_text(storage: &dyn Storage, path: &Path) -> std::result::Result<String, ItemError> {
    read_json::<StoredText>(storage, path)
        .map(|stored| stored.text)
        .map_err(|e| e.into_item_error(path))
}

impl std::fmt::Debug for CorpusAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorpusAnalyzer")
            .field("layout", &self.layout)
            .field("config", &self.config)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Stage for CorpusAnalyzer {
    fn kind(&self) -> StageKind {
        StageKind::Analyze
    }

    async fn execute(&self, cancel: &CancellationToken) -> Result<StageOutcome> {
        self.analyze(cancel).await
    }
}
