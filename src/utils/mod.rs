//! Helpers shared by the library and the binary.

use std::path::PathBuf;

use crate::error::{MergeError, Result};

/// Whether `pattern` contains glob metacharacters.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Expand a glob pattern into the files it matches, sorted by path.
///
/// Plain paths are returned untouched so that missing files are reported
/// when they are registered. A pattern matching no file fails with
/// [`MergeError::SourceNotFound`].
pub fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    if !is_glob_pattern(pattern) {
        return Ok(vec![PathBuf::from(pattern)]);
    }

    let paths = glob::glob(pattern).map_err(|err| {
        MergeError::invalid_config(format!("Invalid glob pattern '{pattern}': {err}"))
    })?;

    let mut resolved_paths = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| MergeError::Io(err.into()))?;
        if path.is_file() {
            resolved_paths.push(path);
        }
    }

    if resolved_paths.is_empty() {
        return Err(MergeError::source_not_found(pattern));
    }

    Ok(resolved_paths)
}

/// Format a byte count as a human-readable size.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(500), "500 bytes");
        assert_eq!(format_file_size(1024), "1.00 KB");
        assert_eq!(format_file_size(1024 * 1024), "1.00 MB");
        assert_eq!(format_file_size(1024 * 1024 * 1024), "1.00 GB");
    }

    #[test]
    fn test_plain_path_is_kept() {
        let paths = collect_paths_for_pattern("does/not/exist.pdf").unwrap();
        assert_eq!(paths, vec![PathBuf::from("does/not/exist.pdf")]);
    }

    #[test]
    fn test_glob_expands_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["b.pdf", "a.pdf", "c.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("d.pdf")).unwrap();

        let pattern = format!("{}/*.pdf", dir.path().display());
        let paths = collect_paths_for_pattern(&pattern).unwrap();
        assert_eq!(
            paths,
            vec![dir.path().join("a.pdf"), dir.path().join("b.pdf")]
        );
    }

    #[test]
    fn test_glob_without_matches() {
        let dir = TempDir::new().unwrap();
        let pattern = format!("{}/*.pdf", dir.path().display());
        let err = collect_paths_for_pattern(&pattern).unwrap_err();
        assert!(matches!(err, MergeError::SourceNotFound { .. }));
    }

    #[test]
    fn test_invalid_glob() {
        let err = collect_paths_for_pattern("[unclosed*.pdf").unwrap_err();
        assert!(matches!(err, MergeError::InvalidConfig { .. }));
    }
}
