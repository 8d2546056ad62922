//! # corpusflow CLI
//!
//! Runs the pipeline stages against a shared storage directory.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `corpusflow process` | Wait for the fetch record, process raw HTML |
//! | `corpusflow analyze` | Wait for the process record, write the final report |
//! | `corpusflow run` | Both stages in one process |
//!
//! ```bash
//! corpusflow --root /shared process
//! corpusflow --root /shared --timeout-secs 600 analyze
//! corpusflow --config ./corpusflow.toml --log-format json run
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use corpusflow::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Stage-coordinated HTML processing and corpus analytics.
#[derive(Parser)]
#[command(name = "corpusflow", version, about)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Shared storage root, overriding the configuration file.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Delay between upstream record checks, in milliseconds.
    #[arg(long, global = true)]
    poll_interval_ms: Option<u64>,

    /// Give up waiting for the upstream stage after this many seconds.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Log output format: `pretty` or `json`.
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the document processor stage.
    Process,
    /// Run the corpus analyzer stage.
    Analyze,
    /// Run both stages in this process; the analyzer is signalled directly.
    Run,
}

impl Cli {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(root) = &self.root {
            config = config.with_root(root);
        }
        if let Some(interval_ms) = self.poll_interval_ms {
            config = config.with_poll_interval_ms(interval_ms);
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config = config.with_timeout_secs(timeout_secs);
        }
        if let Some(format) = self.log_format {
            config = config.with_log_format(format);
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.pipeline_config()?;
    init_logging(&config.logging);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling");
                cancel.cancel("interrupted");
            }
        });
    }

    let storage: Arc<dyn Storage> = Arc::new(FsStorage::new());
    info!(root = %config.storage.root.display(), "Using shared storage");

    match cli.command {
        Commands::Process => {
            let processor = DocumentProcessor::polling(storage, &config);
            let outcome = run_stage(&processor, &cancel)
                .await
                .context("processor stage failed")?;
            log_outcome(StageKind::Process, outcome);
        }
        Commands::Analyze => {
            let analyzer = CorpusAnalyzer::polling(storage, &config);
            let outcome = run_stage(&analyzer, &cancel)
                .await
                .context("analyzer stage failed")?;
            log_outcome(StageKind::Analyze, outcome);
        }
        Commands::Run => {
            let outcome = run_in_process(storage, &config, &cancel)
                .await
                .context("pipeline failed")?;
            log_outcome(StageKind::Process, outcome.process);
            log_outcome(StageKind::Analyze, outcome.analyze);
        }
    }
    Ok(())
}

fn log_outcome(stage: StageKind, outcome: StageOutcome) {
    if outcome.wrote_output() {
        info!(%stage, %outcome, "Stage finished");
    } else {
        info!(%stage, "Stage finished without writing output: {outcome}");
    }
}
