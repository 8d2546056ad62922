//! # Corpusflow
//!
//! A stage-coordinated pipeline that turns fetched HTML into a corpus report.
//!
//! Corpusflow runs two batch stages over a shared storage area:
//!
//! - **Document processing**: strip markup, extract links and images, compute
//!   per-document statistics, write one JSON document per input
//! - **Corpus analysis**: word and n-gram rankings, pairwise Jaccard
//!   similarity and pooled readability in a single final report
//!
//! Stages rendezvous through completion records written atomically to
//! storage, or through an in-process completion channel when both run in one
//! process.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use corpusflow::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn demo() -> corpusflow::errors::Result<()> {
//! let config = PipelineConfig::default().with_root("/shared");
//! let storage: Arc<dyn Storage> = Arc::new(FsStorage::new());
//!
//! let outcome = run_in_process(storage, &config, &CancellationToken::new()).await?;
//! println!("processed: {}, analyzed: {}", outcome.process, outcome.analyze);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cast_precision_loss
)]

pub mod analysis;
pub mod cancellation;
pub mod config;
pub mod coordination;
pub mod core;
pub mod errors;
pub mod extract;
pub mod observability;
pub mod process;
pub mod stages;
pub mod storage;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::analysis::{analyze_corpus, CorpusAnalysis, CorpusAnalyzer, CorpusDocument};
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{
        AnalysisConfig, DecodePolicy, LogFormat, LoggingConfig, PipelineConfig, ProcessingConfig,
    };
    pub use crate::coordination::{
        completion_channel, CompletionWaiter, FetchItem, PollConfig, PollingWaiter, ProcessItem,
        StageCompletionRecord, StorageLayout,
    };
    pub use crate::core::{ItemStatus, StageKind, StageOutcome};
    pub use crate::errors::{CorpusflowError, ItemError};
    pub use crate::extract::{strip_html, TextStatistics};
    pub use crate::observability::init_logging;
    pub use crate::process::{DocumentProcessor, ProcessedDocument};
    pub use crate::stages::{run_in_process, run_stage, PipelineOutcome, Stage};
    pub use crate::storage::{FsStorage, MemoryStorage, Storage};
}
