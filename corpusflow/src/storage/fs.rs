//! Filesystem-backed storage.

use super::Storage;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Storage on the local filesystem.
///
/// Atomic writes go to a hidden sibling (`.<name>.tmp`) that is flushed and
/// then renamed over the destination, so pollers never observe a partial file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl FsStorage {
    /// Creates a filesystem storage handle.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn temp_sibling(path: &Path) -> io::Result<PathBuf> {
        let name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", path.display()),
            )
        })?;
        let mut temp_name = std::ffi::OsString::from(".");
        temp_name.push(name);
        temp_name.push(".tmp");
        Ok(path.with_file_name(temp_name))
    }
}

impl Storage for FsStorage {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let temp = Self::temp_sibling(path)?;
        let result = (|| {
            let mut file = fs::File::create(&temp)?;
            file.write_all(contents)?;
            file.sync_all()?;
            fs::rename(&temp, path)
        })();
        if result.is_err() {
            let _ = fs::remove_file(&temp);
        }
        result
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}
