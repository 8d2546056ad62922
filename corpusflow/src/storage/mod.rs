//! The shared storage area stages rendezvous through.
//!
//! Stages never touch `std::fs` directly. They go through [`Storage`], which
//! has a real filesystem implementation for separate processes and an
//! in-memory one for tests and single-process runs.

mod fs;
mod memory;

pub use fs::FsStorage;
pub use memory::MemoryStorage;

use crate::errors::{CorpusflowError, ItemError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Byte-level access to the shared storage area.
///
/// `write_atomic` must make the new contents visible all at once: a reader
/// either sees the previous state of `path` or the complete new file.
#[cfg_attr(test, mockall::automock)]
pub trait Storage: Send + Sync {
    /// Reads the whole file at `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replaces the file at `path` with `contents` atomically.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Returns true if a file exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Creates `path` and all missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Failure reading or writing a JSON document through [`Storage`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// The underlying storage failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The bytes were not the expected JSON document.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    /// Returns true if the file simply does not exist (yet).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == io::ErrorKind::NotFound)
    }

    /// Converts into a stage-fatal error about `path`.
    #[must_use]
    pub fn into_stage_error(self, path: &Path) -> CorpusflowError {
        match self {
            Self::Io(e) => CorpusflowError::Io(io::Error::new(
                e.kind(),
                format!("{}: {e}", path.display()),
            )),
            Self::Json(e) => CorpusflowError::serialization(path, e),
        }
    }

    /// Converts into a failure of the single document at `path`.
    #[must_use]
    pub fn into_item_error(self, path: &Path) -> ItemError {
        match self {
            Self::Io(e) => ItemError::io(path, e),
            Self::Json(e) => ItemError::malformed(path, e),
        }
    }
}

/// Reads and deserializes a JSON document.
pub fn read_json<T: DeserializeOwned>(
    storage: &dyn Storage,
    path: &Path,
) -> Result<T, StorageError> {
    let bytes = storage.read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Serializes `value` as pretty JSON and writes it atomically.
pub fn write_json<T: Serialize + ?Sized>(
    storage: &dyn Storage,
    path: &Path,
    value: &T,
) -> Result<(), StorageError> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    storage.write_atomic(path, &bytes)?;
    Ok(())
}
