use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::Builder;
use tracing::debug;

use crate::error::Result;

/// Writes finished documents to disk.
pub struct PdfWriter;

impl PdfWriter {
    /// Write `bytes` to `path`, creating missing parent directories.
    ///
    /// The document is staged in a temporary file next to `path` and renamed
    /// into place, so an existing file at `path` is either fully replaced or
    /// left as it was.
    pub fn write<P: AsRef<Path>>(bytes: &[u8], path: P) -> Result<()> {
        let path = path.as_ref();
        let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };

        let mut builder = Builder::new();
        builder.prefix(".pdfmerger-").suffix(".tmp");
        // Same mode File::create would use; the umask still applies.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let mut staged = builder.tempfile_in(parent)?;

        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            writer.write_all(bytes)?;
            writer.flush()?;
        }

        debug!(staged = %staged.path().display(), target = %path.display(), "Renaming staged output");
        staged.persist(path).map_err(|e| e.error)?;

        Ok(())
    }
}
