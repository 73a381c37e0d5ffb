//! Integration tests for basic merge functionality.

use lopdf::{Document, Object};
use pdfmerger::backend::info::{document_info, document_producer};
use pdfmerger::config::{MergeJob, OutputMode};
use pdfmerger::{MergeOutput, PageLayout, PdfMerger, Zoom};
use tempfile::TempDir;

use crate::common::{
    A4, PageSpec, page_labels, page_sizes, page_xobjects, source_a, source_b, temp_output_path,
    write_pdf,
};

fn merge_to_document(merger: &mut PdfMerger) -> Document {
    let bytes = merger
        .merge("string", "merged.pdf")
        .unwrap()
        .into_bytes()
        .unwrap();
    Document::load_mem(&bytes).unwrap()
}

#[test]
fn test_merge_selected_pages_in_order() {
    let dir = TempDir::new().unwrap();
    let a = source_a(dir.path());
    let b = source_b(dir.path());

    let mut merger = PdfMerger::new();
    merger.add_source(&a, "1, 3").unwrap().add_source(&b, "all").unwrap();

    let doc = merge_to_document(&mut merger);

    assert_eq!(page_labels(&doc), vec!["A1", "A3", "B1", "B2"]);
    assert_eq!(
        page_sizes(&doc),
        vec![(595.0, 842.0), (612.0, 792.0), (500.0, 500.0), (300.0, 600.0)]
    );
}

#[test]
fn test_merge_keeps_landscape_pages() {
    let dir = TempDir::new().unwrap();
    let a = source_a(dir.path());

    let mut merger = PdfMerger::new();
    merger.add_source(&a, "2-3").unwrap();

    let doc = merge_to_document(&mut merger);

    assert_eq!(page_labels(&doc), vec!["A2", "A3"]);
    assert_eq!(page_sizes(&doc), vec![(842.0, 595.0), (612.0, 792.0)]);
}

#[test]
fn test_merge_rotated_page_takes_displayed_size() {
    let dir = TempDir::new().unwrap();
    let rotated = write_pdf(
        dir.path(),
        "rotated.pdf",
        &[PageSpec::new("R1", A4).rotated(90), PageSpec::new("R2", A4).rotated(180)],
    );

    let mut merger = PdfMerger::new();
    merger.add_source(&rotated, "all").unwrap();

    let doc = merge_to_document(&mut merger);

    assert_eq!(page_sizes(&doc), vec![(842.0, 595.0), (595.0, 842.0)]);
    assert_eq!(page_labels(&doc), vec!["R1", "R2"]);
}

#[test]
fn test_merge_same_source_twice() {
    let dir = TempDir::new().unwrap();
    let a = source_a(dir.path());

    let mut merger = PdfMerger::new();
    merger.add_source(&a, "3").unwrap().add_source(&a, "1,1").unwrap();

    let doc = merge_to_document(&mut merger);
    assert_eq!(page_labels(&doc), vec!["A3", "A1", "A1"]);

    // A page selected twice is drawn from one imported template.
    let pages: Vec<_> = doc.get_pages().into_values().collect();
    assert_eq!(page_xobjects(&doc, pages[1]), page_xobjects(&doc, pages[2]));
}

#[test]
fn test_merge_applies_metadata_and_display() {
    let dir = TempDir::new().unwrap();
    let a = source_a(dir.path());

    let mut merger = PdfMerger::new();
    merger.add_source(&a, "1").unwrap();
    merger
        .set_author("sample author")
        .set_title("Quarterly report")
        .set_keywords("merge, pdf")
        .set_zoom(Zoom::FullPage)
        .set_page_layout(PageLayout::TwoPageLeft);

    let doc = merge_to_document(&mut merger);

    let info = document_info(&doc);
    assert_eq!(info.author.as_deref(), Some("sample author"));
    assert_eq!(info.title.as_deref(), Some("Quarterly report"));
    assert_eq!(info.keywords.as_deref(), Some("merge, pdf"));
    assert!(info.subject.is_none());
    assert!(info.creator.is_none());
    assert!(document_producer(&doc).unwrap().starts_with("pdfmerger "));

    let catalog = doc.catalog().unwrap();
    assert!(matches!(
        catalog.get(b"PageLayout").unwrap(),
        Object::Name(name) if name == b"TwoPageLeft"
    ));
    let action = catalog.get(b"OpenAction").and_then(Object::as_array).unwrap();
    assert!(matches!(&action[1], Object::Name(name) if name == b"Fit"));
}

#[test]
fn test_merge_unicode_title() {
    let dir = TempDir::new().unwrap();
    let a = source_a(dir.path());

    let mut merger = PdfMerger::new();
    merger.add_source(&a, "1").unwrap();
    merger.set_title("Résumé – 2024");

    let doc = merge_to_document(&mut merger);
    assert_eq!(document_info(&doc).title.as_deref(), Some("Résumé – 2024"));
}

#[test]
fn test_merge_from_bytes() {
    let dir = TempDir::new().unwrap();
    let b = source_b(dir.path());
    let upload = std::fs::read(&b).unwrap();

    let mut merger = PdfMerger::new();
    merger.add_source_bytes(&upload, "2").unwrap();
    assert_eq!(merger.temp_files().count(), 1);

    let doc = merge_to_document(&mut merger);
    assert_eq!(page_labels(&doc), vec!["B2"]);

    let staged: Vec<_> = merger.temp_files().map(|p| p.to_path_buf()).collect();
    merger.cleanup_temp_files();
    assert!(staged.iter().all(|path| !path.exists()));
}

#[test]
fn test_merge_job_from_manifest() {
    let dir = TempDir::new().unwrap();
    let a = source_a(dir.path());
    let b = source_b(dir.path());
    let output = temp_output_path();

    let manifest = serde_json::json!({
        "sources": [
            { "path": a, "pages": "2" },
            { "path": b }
        ],
        "metadata": { "subject": "manifest" },
        "display": { "zoom": 75, "layout": "SinglePage" },
        "mode": "FILE",
        "output": output.to_path_buf(),
    });
    let job = MergeJob::from_json(&manifest.to_string()).unwrap();
    job.validate().unwrap();
    assert_eq!(job.mode, OutputMode::File);

    let mut merger = job.to_merger().unwrap();
    let result = merger.merge_to(job.mode, &job.output).unwrap();
    assert!(matches!(result, MergeOutput::Delivered));

    let doc = Document::load(&output).unwrap();
    assert_eq!(page_labels(&doc), vec!["A2", "B1", "B2"]);
    assert_eq!(document_info(&doc).subject.as_deref(), Some("manifest"));
}
