//! The document processor stage.

use super::document::ProcessedDocument;
use crate::cancellation::CancellationToken;
use crate::config::{DecodePolicy, PipelineConfig, ProcessingConfig};
use crate::coordination::{
    processed_name, CompletionNotifier, CompletionWaiter, DocumentCounts, FetchItem, PollingWaiter,
    ProcessItem, ProcessRecord, StorageLayout,
};
use crate::core::{StageKind, StageOutcome};
use crate::errors::{ItemError, Result};
use crate::stages::Stage;
use crate::storage::{write_json, Storage};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Turns every fetched raw document into a [`ProcessedDocument`].
pub struct DocumentProcessor {
    storage: Arc<dyn Storage>,
    layout: StorageLayout,
    waiter: Arc<dyn CompletionWaiter<FetchItem>>,
    config: ProcessingConfig,
    notifier: Option<CompletionNotifier<ProcessItem>>,
}

impl DocumentProcessor {
    /// Creates a processor that takes its upstream record from `waiter`.
    pub fn new(
        storage: Arc<dyn Storage>,
        layout: StorageLayout,
        waiter: Arc<dyn CompletionWaiter<FetchItem>>,
    ) -> Self {
        Self {
            storage,
            layout,
            waiter,
            config: ProcessingConfig::default(),
            notifier: None,
        }
    }

    /// Creates a processor that polls storage for the fetch record.
    pub fn polling(storage: Arc<dyn Storage>, config: &PipelineConfig) -> Self {
        let waiter = PollingWaiter::new(
            Arc::clone(&storage),
            config.storage.fetch_record_path(),
            StageKind::Fetch,
            config.poll.clone(),
        );
        Self::new(storage, config.storage.clone(), Arc::new(waiter))
            .with_config(config.processing.clone())
    }

    /// Sets concurrency and decode policy.
    #[must_use]
    pub fn with_config(mut self, config: ProcessingConfig) -> Self {
        self.config = config;
        self
    }

    /// Also publishes the completion record in-process once it is on storage.
    #[must_use]
    pub fn with_notifier(mut self, notifier: CompletionNotifier<ProcessItem>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Waits for the fetch stage, processes every successfully fetched
    /// document and writes the process record.
    ///
    /// A document that cannot be read, decoded or written becomes a `failed`
    /// item. Failing to create directories or to write the record is fatal.
    pub async fn process(&self, cancel: &CancellationToken) -> Result<StageOutcome> {
        for dir in self.layout.output_dirs(StageKind::Process) {
            self.storage.create_dir_all(&dir)?;
        }

        let fetched = self.waiter.wait(cancel).await?;
        let files: Vec<String> = fetched.successes().map(|item| item.file.clone()).collect();
        info!(files = files.len(), "Processing {} files...", files.len());

        let results = self.process_all(files).await;
        let record = ProcessRecord::from_results(results);

        let path = self.layout.process_record_path();
        write_json(self.storage.as_ref(), &path, &record).map_err(|e| e.into_stage_error(&path))?;

        info!(
            items_total = record.items_total,
            items_succeeded = record.items_succeeded,
            items_failed = record.items_failed,
            "Processor complete: {}/{} files successful",
            record.items_succeeded,
            record.items_total
        );

        let outcome = StageOutcome::completed(record.items_succeeded, record.items_failed);
        if let Some(notifier) = &self.notifier {
            notifier.publish(record);
        }
        Ok(outcome)
    }

    /// Handles documents `concurrency` at a time, keeping input order.
    async fn process_all(&self, files: Vec<String>) -> Vec<ProcessItem> {
        let decode = self.config.decode;
        let jobs = files.into_iter().map(|file| {
            let storage = Arc::clone(&self.storage);
            let paths = self.resolve(&file);
            async move {
                let output_file = processed_name(&file);
                let handled = match paths {
                    Ok((raw, out)) => {
                        let source = file.clone();
                        tokio::task::spawn_blocking(move || {
                            handle_document(storage.as_ref(), &source, &raw, &out, decode)
                        })
                        .await
                        .unwrap_or_else(|e| Err(ItemError::Worker(file.clone(), e.to_string())))
                    }
                    Err(e) => Err(e),
                };
                finish_item(file, output_file, handled)
            }
        });

        stream::iter(jobs)
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }

    fn resolve(&self, file: &str) -> std::result::Result<(PathBuf, PathBuf), ItemError> {
        let raw = self.layout.raw_document(file)?;
        let out = self.layout.processed_document(&processed_name(file))?;
        Ok((raw, out))
    }
}

fn handle_document(
    storage: &dyn Storage,
    source_file: &str,
    raw: &std::path::Path,
    out: &std::path::Path,
    decode: DecodePolicy,
) -> std::result::Result<DocumentCounts, ItemError> {
    let bytes = storage.read(raw).map_err(|e| ItemError::io(raw, e))?;
    let html = decode.decode(bytes).map_err(|source| ItemError::Decode {
        path: raw.to_path_buf(),
        source,
    })?;

    let document = ProcessedDocument::from_html(source_file, &html);
    write_json(storage, out, &document).map_err(|e| e.into_item_error(out))?;

    Ok(DocumentCounts {
        word_count: document.statistics.word_count,
        link_count: document.links.len(),
        image_count: document.images.len(),
    })
}

fn finish_item(
    source_file: String,
    output_file: String,
    handled: std::result::Result<DocumentCounts, ItemError>,
) -> ProcessItem {
    match handled {
        Ok(counts) => {
            info!(
                source_file = %source_file,
                word_count = counts.word_count,
                link_count = counts.link_count,
                image_count = counts.image_count,
                "Processed {source_file} -> {} words, {} links, {} images",
                counts.word_count,
                counts.link_count,
                counts.image_count
            );
            ProcessItem::success(source_file, output_file, counts)
        }
        Err(e) => {
            warn!(source_file = %source_file, error = %e, "Failed to process {source_file}");
            ProcessItem::failed(source_file, output_file)
        }
    }
}

impl std::fmt::Debug for DocumentProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentProcessor")
            .field("layout", &self.layout)
            .field("config", &self.config)
            .field("notifies", &self.notifier.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Stage for DocumentProcessor {
    fn kind(&self) -> StageKind {
        StageKind::Process
    }

    async fn execute(&self, cancel: &CancellationToken) -> Result<StageOutcome> {
        self.process(cancel).await
    }
}
