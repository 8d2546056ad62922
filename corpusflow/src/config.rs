//! Pipeline configuration.
//!
//! Every field has a default, so an empty TOML file (or no file at all)
//! reproduces the historical `/shared` deployment.

use crate::coordination::{PollConfig, StorageLayout};
use crate::errors::{CorpusflowError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration shared by both stages and the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Storage layout.
    #[serde(default)]
    pub storage: StorageLayout,
    /// Upstream polling.
    #[serde(default)]
    pub poll: PollConfig,
    /// Document processor settings.
    #[serde(default)]
    pub processing: ProcessingConfig,
    /// Corpus analyzer settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PipelineConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CorpusflowError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&raw).map_err(|e| {
            CorpusflowError::Config(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot rule out on its own.
    pub fn validate(&self) -> Result<()> {
        if self.processing.concurrency == 0 {
            return Err(CorpusflowError::Config(
                "processing.concurrency must be greater than zero".to_string(),
            ));
        }
        if self.poll.interval_ms == 0 {
            return Err(CorpusflowError::Config(
                "poll.interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.storage.fetch_record.is_empty()
            || self.storage.process_record.is_empty()
            || self.storage.report.is_empty()
        {
            return Err(CorpusflowError::Config(
                "storage record and report file names must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Moves the storage root.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.storage.root = root.into();
        self
    }

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.poll.interval_ms = interval_ms;
        self
    }

    /// Sets the upstream wait bound.
    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.poll.timeout_secs = Some(timeout_secs);
        self
    }

    /// Sets the log output format.
    #[must_use]
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.logging.format = format;
        self
    }
}

/// How raw bytes that are not valid UTF-8 are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Fail the document.
    #[default]
    Strict,
    /// Drop invalid sequences and keep going.
    Lossy,
}

impl DecodePolicy {
    /// Decodes `bytes` under this policy. An error means the document fails.
    pub fn decode(self, bytes: Vec<u8>) -> std::result::Result<String, std::string::FromUtf8Error> {
        match self {
            Self::Strict => String::from_utf8(bytes),
            Self::Lossy => Ok(match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => lossy_without_replacements(e.as_bytes()),
            }),
        }
    }
}

fn lossy_without_replacements(bytes: &[u8]) -> String {
    bytes
        .utf8_chunks()
        .map(|chunk| chunk.valid())
        .collect()
}

/// Settings for the document processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Documents handled at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// UTF-8 decode policy for raw documents.
    #[serde(default)]
    pub decode: DecodePolicy,
}

fn default_concurrency() -> usize {
    4
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            decode: DecodePolicy::default(),
        }
    }
}

/// Settings for the corpus analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Entries in the word ranking.
    #[serde(default = "default_top_words")]
    pub top_words: usize,
    /// Entries in the bigram ranking.
    #[serde(default = "default_top_ngrams")]
    pub top_bigrams: usize,
    /// Entries in the trigram ranking.
    #[serde(default = "default_top_ngrams")]
    pub top_trigrams: usize,
}

fn default_top_words() -> usize {
    100
}

fn default_top_ngrams() -> usize {
    20
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_words: default_top_words(),
            top_bigrams: default_top_ngrams(),
            top_trigrams: default_top_ngrams(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = CorpusflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(CorpusflowError::Config(format!(
                "unknown log format {other:?}, expected \"pretty\" or \"json\""
            ))),
        }
    }
}

/// Settings for [`crate::observability::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
        }
    }
}
