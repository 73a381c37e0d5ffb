//! Integration tests for the four output modes.

use lopdf::Document;
use pdfmerger::io::{HttpSink, WriterSink};
use pdfmerger::{MergeError, MergeOutput, PdfMerger};
use serial_test::serial;
use std::path::Path;
use tempfile::TempDir;

use crate::common::{SharedBuffer, page_labels, source_a, source_b};

fn merger_for(dir: &Path) -> PdfMerger {
    let mut merger = PdfMerger::new();
    merger
        .add_source(source_a(dir), "1,3")
        .unwrap()
        .add_source(source_b(dir), "all")
        .unwrap();
    merger.set_title("Modes");
    merger
}

#[test]
fn test_string_and_file_modes_produce_same_document() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("nested").join("merged.pdf");
    let mut merger = merger_for(dir.path());

    let bytes = merger
        .merge("STRING", &output)
        .unwrap()
        .into_bytes()
        .unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(!output.exists());

    let result = merger.merge("file", &output).unwrap();
    assert!(result.is_delivered());
    assert_eq!(std::fs::read(&output).unwrap(), bytes);
}

#[test]
fn test_browser_mode_streams_raw_pdf() {
    let dir = TempDir::new().unwrap();
    let buffer = SharedBuffer::default();
    let mut merger = merger_for(dir.path());
    merger.set_response_sink(WriterSink::new(buffer.clone()));

    let result = merger.merge("browser", "report.pdf").unwrap();
    assert!(matches!(result, MergeOutput::Delivered));

    let streamed = buffer.contents();
    let doc = Document::load_mem(&streamed).unwrap();
    assert_eq!(page_labels(&doc), vec!["A1", "A3", "B1", "B2"]);
}

#[test]
fn test_unknown_mode_streams_inline() {
    let dir = TempDir::new().unwrap();
    let buffer = SharedBuffer::default();
    let mut merger = merger_for(dir.path());
    merger.set_response_sink(HttpSink::new(buffer.clone()));

    merger.merge("pdf", "out/report.pdf").unwrap();

    let streamed = String::from_utf8_lossy(&buffer.contents()).into_owned();
    assert!(streamed.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(streamed.contains("Content-Type: application/pdf\r\n"));
    assert!(streamed.contains("Content-Disposition: inline; filename=\"report.pdf\"\r\n"));
}

#[test]
fn test_download_mode_sends_attachment_headers() {
    let dir = TempDir::new().unwrap();
    let buffer = SharedBuffer::default();
    let mut merger = merger_for(dir.path());
    merger.set_response_sink(HttpSink::new(buffer.clone()));

    merger.merge("download", "report.pdf").unwrap();

    let streamed = buffer.contents();
    let split = streamed
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .unwrap();
    let headers = String::from_utf8_lossy(&streamed[..split]).into_owned();
    let body = &streamed[split + 4..];

    assert!(headers.contains("Content-Type: application/x-download"));
    assert!(headers.contains("Content-Disposition: attachment; filename=\"report.pdf\""));
    assert!(headers.contains(&format!("Content-Length: {}", body.len())));
    assert!(body.starts_with(b"%PDF-"));
}

#[test]
fn test_second_http_delivery_fails() {
    let dir = TempDir::new().unwrap();
    let mut merger = merger_for(dir.path());
    merger.set_response_sink(HttpSink::new(SharedBuffer::default()));

    merger.merge("download", "report.pdf").unwrap();
    let err = merger.merge("download", "report.pdf").unwrap_err();
    assert!(matches!(err, MergeError::Output { .. }));
}

#[test]
#[serial]
fn test_file_mode_default_output_path() {
    let dir = TempDir::new().unwrap();
    let mut merger = merger_for(dir.path());

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let result = merger.merge("FILE", pdfmerger::config::DEFAULT_OUTPUT_PATH);
    std::env::set_current_dir(previous).unwrap();

    result.unwrap();
    let written = dir.path().join("newfile.pdf");
    let doc = Document::load(&written).unwrap();
    assert_eq!(doc.get_pages().len(), 4);
}
