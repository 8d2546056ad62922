//! Error types for the corpusflow pipeline.
//!
//! Two levels exist. [`CorpusflowError`] is fatal to the stage that raises it
//! and ends the process with a non-zero status. [`ItemError`] belongs to a
//! single document: it is logged, recorded as `failed` in the completion
//! record, and never propagates past the owning stage.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The main error type for corpusflow stage operations.
#[derive(Debug, Error)]
pub enum CorpusflowError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A file read or written by a stage could not be (de)serialized.
    #[error("Serialization error in {path}: {message}")]
    Serialization {
        /// File being read or written.
        path: PathBuf,
        /// Underlying serializer message.
        message: String,
    },

    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The upstream stage did not signal completion within the wait bound.
    #[error("Timed out after {waited:?} waiting for upstream record {path}")]
    UpstreamTimeout {
        /// Completion record that never appeared.
        path: PathBuf,
        /// How long the stage waited.
        waited: Duration,
    },

    /// The wait was cancelled.
    #[error("Stage cancelled: {0}")]
    Cancelled(String),

    /// The in-process completion channel closed before a record was published.
    #[error("Completion channel for {0} closed before the upstream stage finished")]
    ChannelClosed(String),

    /// A generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CorpusflowError {
    /// Creates a serialization error for `path`.
    #[must_use]
    pub fn serialization(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Serialization {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Returns true if the error came from cancellation rather than a fault.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Failure of a single document inside a stage.
#[derive(Debug, Error)]
pub enum ItemError {
    /// The document could not be read or written.
    #[error("IO error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The raw bytes were not valid UTF-8 under the strict decode policy.
    #[error("{path} is not valid UTF-8: {source}")]
    Decode {
        /// File involved.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The document could not be (de)serialized.
    #[error("Malformed document {path}: {message}")]
    Malformed {
        /// File involved.
        path: PathBuf,
        /// Underlying serializer message.
        message: String,
    },

    /// The upstream record named a document outside the storage directory.
    #[error("Refusing document name {0:?}: not a plain file name")]
    InvalidName(String),

    /// The worker handling the document panicked or was aborted.
    #[error("Worker for {0} did not finish: {1}")]
    Worker(String, String),
}

impl ItemError {
    /// Creates an IO item error.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a malformed-document item error.
    #[must_use]
    pub fn malformed(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Malformed {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for stage-level operations.
pub type Result<T> = std::result::Result<T, CorpusflowError>;
