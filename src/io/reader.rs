use std::path::Path;

use crate::error::{MergeError, Result};

/// Checks performed on source paths before they are registered.
pub struct PdfReader;

impl PdfReader {
    /// Fail with [`MergeError::SourceNotFound`] unless `path` is an existing file.
    pub fn check_path_exists<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let exists = path.try_exists()?;
        if !exists || path.is_dir() {
            return Err(MergeError::source_not_found(path));
        }

        Ok(())
    }
}
