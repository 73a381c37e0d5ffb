//! Temporary files backing in-memory sources.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{Builder, TempPath};
use tracing::{debug, warn};

use crate::error::{MergeError, Result};

/// Prefix of every staged file name.
pub const TEMP_FILE_PREFIX: &str = "PDFMerger";

/// Uniquely named files in the system temp directory.
///
/// Files are removed by [`TempFiles::cleanup`] or when the set is dropped.
#[derive(Debug, Default)]
pub struct TempFiles {
    paths: Vec<TempPath>,
}

impl TempFiles {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `bytes` to a new temporary file and return its path.
    pub fn stage(&mut self, bytes: &[u8]) -> Result<PathBuf> {
        let mut file = Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .suffix(".pdf")
            .tempfile()
            .map_err(|source| MergeError::TempFile { source })?;

        file.write_all(bytes)
            .and_then(|()| file.flush())
            .map_err(|source| MergeError::TempFile { source })?;

        let path = file.into_temp_path();
        let staged = path.to_path_buf();
        debug!(path = %staged.display(), bytes = bytes.len(), "Staged temporary source");

        self.paths.push(path);
        Ok(staged)
    }

    /// Delete every staged file and forget it.
    ///
    /// Deletion failures are logged and otherwise ignored.
    pub fn cleanup(&mut self) {
        for path in self.paths.drain(..) {
            let staged = path.to_path_buf();
            if let Err(e) = path.close() {
                warn!(path = %staged.display(), error = %e, "Failed to remove temporary file");
            }
        }
    }

    /// Paths currently staged.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(|p| &**p)
    }

    /// Number of staged files.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
