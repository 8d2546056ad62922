//! Stage trait and the run wrapper shared by every stage.
//!
//! A stage is an independent batch job: it waits for its upstream record,
//! handles every listed item and writes its own outputs. The concrete stages
//! live in [`crate::process`] and [`crate::analysis`].

use crate::analysis::CorpusAnalyzer;
use crate::cancellation::CancellationToken;
use crate::config::PipelineConfig;
use crate::coordination::{completion_channel, ProcessItem};
use crate::core::{StageKind, StageOutcome};
use crate::errors::Result;
use crate::process::DocumentProcessor;
use crate::storage::Storage;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Trait for pipeline stages.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Which stage this is.
    fn kind(&self) -> StageKind;

    /// Executes one run of the stage.
    ///
    /// Item-level failures are recorded, never returned. An `Err` is fatal.
    async fn execute(&self, cancel: &CancellationToken) -> Result<StageOutcome>;
}

/// Runs `stage` inside a span carrying the stage name and a fresh run id.
pub async fn run_stage(stage: &dyn Stage, cancel: &CancellationToken) -> Result<StageOutcome> {
    let kind = stage.kind();
    let run_id = Uuid::new_v4();
    let span = info_span!("stage", stage = %kind, run_id = %run_id);

    async move {
        let started = Instant::now();
        info!("{kind} stage starting");

        match stage.execute(cancel).await {
            Ok(outcome) => {
                info!(
                    elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                    "{kind} stage finished: {outcome}"
                );
                Ok(outcome)
            }
            Err(e) if e.is_cancellation() => {
                info!(reason = %e, "{kind} stage cancelled");
                Err(e)
            }
            Err(e) => {
                error!(error = %e, "{kind} stage failed");
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}

/// Outcomes of both stages run by [`run_in_process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOutcome {
    /// Processor outcome.
    pub process: StageOutcome,
    /// Analyzer outcome.
    pub analyze: StageOutcome,
}

/// Runs the processor and the analyzer concurrently in this process.
///
/// The processor still polls storage for the fetch record and still writes
/// its record to storage; the analyzer is handed that record through a
/// completion channel instead of polling for it. A fatal error in either
/// stage stops both.
pub async fn run_in_process(
    storage: Arc<dyn Storage>,
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> Result<PipelineOutcome> {
    let (notifier, waiter) = completion_channel::<ProcessItem>(StageKind::Process);
    let processor = DocumentProcessor::polling(Arc::clone(&storage), config).with_notifier(notifier);
    let analyzer = CorpusAnalyzer::new(storage, config.storage.clone(), Arc::new(waiter))
        .with_config(config.analysis.clone())
        .with_concurrency(config.processing.concurrency);

    let (process, analyze) = tokio::try_join!(
        run_stage(&processor, cancel),
        run_stage(&analyzer, cancel)
    )?;
    Ok(PipelineOutcome { process, analyze })
}
