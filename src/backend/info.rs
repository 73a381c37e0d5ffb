//! Info dictionary and catalog viewer entries.
//!
//! Text is written as a PDF text string: plain literal bytes when ASCII,
//! otherwise UTF-16BE with a byte order mark.

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use tracing::warn;

use crate::config::{DocumentMetadata, PageLayout, Zoom};

const UTF16_BOM: [u8; 2] = [0xFE, 0xFF];

/// Encode `text` as a PDF text string.
pub fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = UTF16_BOM.to_vec();
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Decode a PDF text string written by [`text_string`] or a PDF producer.
pub fn decode_text_string(bytes: &[u8]) -> Option<String> {
    match bytes.strip_prefix(&UTF16_BOM) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        None => String::from_utf8(bytes.to_vec()).ok(),
    }
}

/// Set one text entry of an Info dictionary.
pub(crate) fn set_info_field(info: &mut Dictionary, key: &str, value: &str) {
    info.set(key, text_string(value));
}

/// Read the Info dictionary of a document.
///
/// Missing or undecodable entries are `None`.
pub fn document_info(doc: &Document) -> DocumentMetadata {
    let Some(info) = doc
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .and_then(|id| doc.get_object(id))
        .and_then(Object::as_dict)
        .ok()
    else {
        return DocumentMetadata::default();
    };

    DocumentMetadata {
        author: string_field(info, b"Author"),
        creator: string_field(info, b"Creator"),
        subject: string_field(info, b"Subject"),
        title: string_field(info, b"Title"),
        keywords: string_field(info, b"Keywords"),
    }
}

/// Read the `/Producer` entry of a document's Info dictionary.
pub fn document_producer(doc: &Document) -> Option<String> {
    doc.trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .and_then(|id| doc.get_object(id))
        .and_then(Object::as_dict)
        .ok()
        .and_then(|info| string_field(info, b"Producer"))
}

fn string_field(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => decode_text_string(bytes),
        _ => None,
    }
}

/// Add `/PageLayout` and `/OpenAction` to a catalog.
///
/// The open action targets `first_page`; it is skipped for documents
/// without pages and for [`Zoom::Default`].
pub(crate) fn apply_display(
    catalog: &mut Dictionary,
    zoom: Zoom,
    layout: PageLayout,
    first_page: Option<ObjectId>,
) {
    if let Some(name) = layout.pdf_name() {
        catalog.set("PageLayout", Object::Name(name.as_bytes().to_vec()));
    }

    let Some(first_page) = first_page else {
        return;
    };
    if !zoom.is_valid() {
        warn!(%zoom, "Skipping open action for invalid zoom");
        return;
    }

    let destination = match zoom {
        Zoom::Default => return,
        Zoom::FullPage => vec![Object::Name(b"Fit".to_vec())],
        Zoom::FullWidth => vec![Object::Name(b"FitH".to_vec()), Object::Null],
        Zoom::Real => xyz_destination(1.0),
        Zoom::Percent(percent) => xyz_destination(percent / 100.0),
    };

    let mut action = vec![Object::Reference(first_page)];
    action.extend(destination);
    catalog.set("OpenAction", Object::Array(action));
}

fn xyz_destination(scale: f32) -> Vec<Object> {
    vec![
        Object::Name(b"XYZ".to_vec()),
        Object::Null,
        Object::Null,
        Object::Real(scale),
    ]
}
