//! Integration tests for error handling and edge cases.

use pdfmerger::{MergeError, PageRangeError, PdfMerger};
use std::path::PathBuf;
use tempfile::TempDir;

use crate::common::{source_a, source_b, temp_output_path};

#[test]
fn test_error_nonexistent_source() {
    let mut merger = PdfMerger::new();
    let err = merger
        .add_source("/nonexistent/file.pdf", "all")
        .unwrap_err();

    assert!(matches!(err, MergeError::SourceNotFound { .. }));
    assert!(merger.sources().is_empty());
}

#[test]
fn test_error_no_sources() {
    let mut merger = PdfMerger::new();
    let err = merger.merge("file", "unused.pdf").unwrap_err();

    assert!(matches!(err, MergeError::NoSources));
    assert!(!PathBuf::from("unused.pdf").exists());
}

#[test]
fn test_error_reversed_range() {
    let dir = TempDir::new().unwrap();
    let a = source_a(dir.path());

    let mut merger = PdfMerger::new();
    let err = merger.add_source(&a, "3-1").unwrap_err();

    assert!(matches!(
        err,
        MergeError::InvalidRange(PageRangeError::StartAfterEnd { start: 3, end: 1 })
    ));
}

#[test]
fn test_error_page_out_of_range_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let a = source_a(dir.path());
    let b = source_b(dir.path());
    let output = dir.path().join("out.pdf");

    let mut merger = PdfMerger::new();
    merger.add_source(&a, "1").unwrap().add_source(&b, "99").unwrap();

    let err = merger.merge("file", &output).unwrap_err();
    match err {
        MergeError::PageImport { page, path } => {
            assert_eq!(page, 99);
            assert_eq!(path, b);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
}

#[test]
fn test_error_corrupted_pdf() {
    let dir = TempDir::new().unwrap();
    let corrupted = dir.path().join("corrupted.pdf");
    std::fs::write(&corrupted, b"this is not a PDF").unwrap();

    let mut merger = PdfMerger::new();
    // Registration only checks that the file exists.
    merger.add_source(&corrupted, "all").unwrap();

    let err = merger.merge("string", "merged.pdf").unwrap_err();
    assert!(matches!(err, MergeError::SourceLoad { .. }));
}

#[test]
fn test_error_corrupted_bytes() {
    let mut merger = PdfMerger::new();
    merger.add_source_bytes(b"%PDF-garbage", "1").unwrap();

    let err = merger.merge("string", "merged.pdf").unwrap_err();
    assert!(matches!(err, MergeError::SourceLoad { .. }));

    merger.cleanup_temp_files();
    assert_eq!(merger.temp_files().count(), 0);
}

#[test]
fn test_cleanup_twice_is_harmless() {
    let dir = TempDir::new().unwrap();
    let bytes = std::fs::read(source_a(dir.path())).unwrap();

    let mut merger = PdfMerger::new();
    merger.add_source_bytes(&bytes, "all").unwrap();
    merger.add_source_bytes(&bytes, "2").unwrap();
    assert_eq!(merger.temp_files().count(), 2);

    merger.cleanup_temp_files();
    merger.cleanup_temp_files();
    assert_eq!(merger.temp_files().count(), 0);
}

#[test]
fn test_failed_merge_can_be_retried() {
    let dir = TempDir::new().unwrap();
    let a = source_a(dir.path());
    let output = temp_output_path();

    let mut merger = PdfMerger::new();
    merger.add_source(&a, "4").unwrap();
    assert!(merger.merge("file", &output).is_err());

    let mut merger = PdfMerger::new();
    merger.add_source(&a, "3").unwrap();
    assert!(merger.merge("file", &output).is_ok());
    assert!(std::fs::metadata(&output).unwrap().len() > 0);
}

#[test]
fn test_error_huge_range_stops_at_document_end() {
    let dir = TempDir::new().unwrap();
    let a = source_a(dir.path());
    let output = dir.path().join("out.pdf");

    let mut merger = PdfMerger::new();
    merger.add_source(&a, "2-8388607").unwrap();

    let err = merger.merge("file", &output).unwrap_err();
    assert!(matches!(err, MergeError::PageImport { page: 4, .. }));
    assert!(!output.exists());
}

#[test]
fn test_error_page_number_above_limit() {
    let dir = TempDir::new().unwrap();
    let a = source_a(dir.path());

    let mut merger = PdfMerger::new();
    let err = merger.add_source(&a, "1-4294967295").unwrap_err();
    assert!(matches!(
        err,
        MergeError::InvalidRange(PageRangeError::Malformed { .. })
    ));
}
