//! Shared helpers for the pdfmerger integration tests.
//!
//! Source documents are generated with lopdf on the fly: every page carries
//! a text label so the merged output can be checked for page order.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A4 portrait.
pub const A4: [f32; 4] = [0.0, 0.0, 595.0, 842.0];
/// A4 landscape.
pub const A4_LANDSCAPE: [f32; 4] = [0.0, 0.0, 842.0, 595.0];
/// US Letter portrait.
pub const LETTER: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// One page of a generated source document.
#[derive(Debug, Clone, Copy)]
pub struct PageSpec {
    pub label: &'static str,
    pub media_box: [f32; 4],
    pub rotate: i64,
}

impl PageSpec {
    pub fn new(label: &'static str, media_box: [f32; 4]) -> Self {
        Self {
            label,
            media_box,
            rotate: 0,
        }
    }

    pub fn rotated(mut self, rotate: i64) -> Self {
        self.rotate = rotate;
        self
    }
}

/// Write a PDF with the given pages to `dir/name`.
pub fn write_pdf(dir: &Path, name: &str, pages: &[PageSpec]) -> PathBuf {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for page in pages {
        let content = format!("BT /F1 24 Tf 72 72 Td ({}) Tj ET", page.label);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => page.media_box.iter().map(|&v| Object::Real(v)).collect::<Vec<_>>(),
            "Rotate" => Object::Integer(page.rotate),
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => Object::Integer(kids.len() as i64),
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).expect("Failed to write source PDF");
    path
}

/// Three pages: A1 portrait, A2 landscape, A3 letter.
pub fn source_a(dir: &Path) -> PathBuf {
    write_pdf(
        dir,
        "a.pdf",
        &[
            PageSpec::new("A1", A4),
            PageSpec::new("A2", A4_LANDSCAPE),
            PageSpec::new("A3", LETTER),
        ],
    )
}

/// Two pages: B1 square, B2 narrow portrait.
pub fn source_b(dir: &Path) -> PathBuf {
    write_pdf(
        dir,
        "b.pdf",
        &[
            PageSpec::new("B1", [0.0, 0.0, 500.0, 500.0]),
            PageSpec::new("B2", [0.0, 0.0, 300.0, 600.0]),
        ],
    )
}

/// Create a temporary output path for test results.
pub fn temp_output_path() -> tempfile::TempPath {
    tempfile::NamedTempFile::new()
        .expect("Failed to create temp file")
        .into_temp_path()
}

/// Width and height of every page, in page order.
pub fn page_sizes(doc: &Document) -> Vec<(f32, f32)> {
    doc.get_pages()
        .into_values()
        .map(|id| {
            let page = doc.get_object(id).and_then(Object::as_dict).unwrap();
            let media_box = page.get(b"MediaBox").and_then(Object::as_array).unwrap();
            let value = |i: usize| media_box[i].as_float().unwrap();
            (value(2) - value(0), value(3) - value(1))
        })
        .collect()
}

/// Form XObjects drawn on a page.
pub fn page_xobjects(doc: &Document, page_id: ObjectId) -> Vec<ObjectId> {
    let page = doc.get_object(page_id).and_then(Object::as_dict).unwrap();
    let resources = page.get(b"Resources").and_then(Object::as_dict).unwrap();
    let xobjects = resources.get(b"XObject").and_then(Object::as_dict).unwrap();
    xobjects
        .iter()
        .map(|(_, value)| value.as_reference().unwrap())
        .collect()
}

/// The text labels drawn on every page, in page order.
pub fn page_labels(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            page_xobjects(doc, page_id)
                .into_iter()
                .map(|id| label_of(&stream_text(doc, id)))
                .collect::<Vec<_>>()
                .join("+")
        })
        .collect()
}

fn stream_text(doc: &Document, id: ObjectId) -> String {
    let stream = doc.get_object(id).and_then(Object::as_stream).unwrap();
    let bytes = if stream.dict.has(b"Filter") {
        stream.decompressed_content().unwrap()
    } else {
        stream.content.clone()
    };
    String::from_utf8_lossy(&bytes).into_owned()
}

fn label_of(content: &str) -> String {
    content
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(label, _)| label.to_string())
        .unwrap_or_default()
}

/// A writer whose contents stay readable after it is handed to a sink.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
