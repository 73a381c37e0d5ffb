//! lopdf implementation of [`OutputDocument`].
//!
//! Each imported page becomes a Form XObject in the output document. Its
//! bounding box is the source page's CropBox (or MediaBox), its resources
//! are deep-copied from the source, and `/Rotate` is honoured by the
//! transformation used when the template is drawn.
//!
//! Objects copied from a source are memoized per source file, so a page
//! imported twice, or two pages sharing a font, reference the same copy.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::{debug, trace};

use crate::backend::info::{apply_display, set_info_field, text_string};
use crate::backend::{Orientation, OutputDocument, PageSize, PdfBackend, TemplateId};
use crate::config::{PageLayout, Zoom};
use crate::error::{MergeError, Result};

/// US Letter, used when a page has neither CropBox nor MediaBox.
const DEFAULT_PAGE_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Lowest PDF version written; raised to the newest source version.
const BASE_PDF_VERSION: &str = "1.4";

/// Guard against `/Parent` cycles in malformed page trees.
const MAX_TREE_DEPTH: usize = 64;

/// Value of the `/Producer` Info entry.
pub const PRODUCER: &str = concat!("pdfmerger ", env!("CARGO_PKG_VERSION"));

/// Default backend: assembles output documents with lopdf.
#[derive(Debug, Clone)]
pub struct LopdfBackend {
    compress: bool,
}

impl LopdfBackend {
    /// Create a backend that compresses output streams.
    pub fn new() -> Self {
        Self { compress: true }
    }

    /// Enable or disable stream compression in the output.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

impl Default for LopdfBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBackend for LopdfBackend {
    type Document = LopdfOutput;

    fn create_document(&self) -> LopdfOutput {
        LopdfOutput::new(self.compress)
    }
}

/// A parsed source and the objects already copied out of it.
struct SourceDocument {
    path: PathBuf,
    document: Document,
    page_ids: Vec<ObjectId>,
    copied: BTreeMap<ObjectId, ObjectId>,
    imported: BTreeMap<u32, TemplateId>,
}

impl SourceDocument {
    fn load(path: &Path) -> Result<Self> {
        let document =
            Document::load(path).map_err(|e| MergeError::source_load(path, e.to_string()))?;
        let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();

        debug!(
            path = %path.display(),
            pages = page_ids.len(),
            version = %document.version,
            "Loaded source document"
        );

        Ok(Self {
            path: path.to_path_buf(),
            document,
            page_ids,
            copied: BTreeMap::new(),
            imported: BTreeMap::new(),
        })
    }

    fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }

    /// Copy page `page_id` into `target` as a Form XObject.
    fn import_page(&mut self, target: &mut Document, page_id: ObjectId) -> Result<Template> {
        let source = &self.document;
        let page = source
            .get_object(page_id)
            .and_then(Object::as_dict)
            .map_err(|e| MergeError::source_load(&self.path, e.to_string()))?;

        let bbox = inherited(source, page, b"CropBox")
            .and_then(|obj| read_box(source, obj))
            .or_else(|| inherited(source, page, b"MediaBox").and_then(|obj| read_box(source, obj)))
            .unwrap_or(DEFAULT_PAGE_BOX);
        let rotation = page_rotation(source, page);

        let resources = match inherited(source, page, b"Resources") {
            Some(resources) => copy_object(target, source, &mut self.copied, resources),
            None => Object::Dictionary(Dictionary::new()),
        };

        let mut form = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "FormType" => Object::Integer(1),
            "BBox" => bbox.iter().map(|&v| Object::Real(v)).collect::<Vec<_>>(),
            "Resources" => resources,
        };

        let content = match page_content(source, page)
            .map_err(|e| MergeError::source_load(&self.path, e.to_string()))?
        {
            PageContent::Encoded(stream) => {
                for key in [b"Filter".as_slice(), b"DecodeParms".as_slice()] {
                    if let Ok(value) = stream.dict.get(key) {
                        let value = copy_object(target, source, &mut self.copied, value);
                        form.set(key.to_vec(), value);
                    }
                }
                stream.content.clone()
            }
            PageContent::Decoded(bytes) => bytes,
        };

        let mut xobject = Stream::new(form, content);
        if xobject.dict.has(b"Filter") {
            xobject = xobject.with_compression(false);
        }
        let xobject_id = target.add_object(xobject);

        let (width, height) = (bbox[2] - bbox[0], bbox[3] - bbox[1]);
        let size = match rotation {
            90 | 270 => PageSize::new(height, width),
            _ => PageSize::new(width, height),
        };

        trace!(
            path = %self.path.display(),
            ?page_id,
            rotation,
            width = size.width,
            height = size.height,
            "Imported page"
        );

        Ok(Template {
            xobject_id,
            size,
            matrix: placement_matrix(bbox, rotation),
        })
    }
}

/// An imported page ready to be drawn.
struct Template {
    xobject_id: ObjectId,
    size: PageSize,
    matrix: [f32; 6],
}

/// An output page under construction.
struct OutputPage {
    size: PageSize,
    xobjects: Dictionary,
    content: Vec<u8>,
}

/// Output document assembled by [`LopdfBackend`].
pub struct LopdfOutput {
    document: Document,
    sources: HashMap<PathBuf, SourceDocument>,
    current_source: Option<PathBuf>,
    templates: Vec<Template>,
    pages: Vec<OutputPage>,
    info: Dictionary,
    display: Option<(Zoom, PageLayout)>,
    compress: bool,
}

impl LopdfOutput {
    fn new(compress: bool) -> Self {
        Self {
            document: Document::with_version(BASE_PDF_VERSION),
            sources: HashMap::new(),
            current_source: None,
            templates: Vec::new(),
            pages: Vec::new(),
            info: Dictionary::new(),
            display: None,
            compress,
        }
    }

    /// Number of output pages added so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn template(&self, template: TemplateId) -> Result<&Template> {
        self.templates
            .get(template.0)
            .ok_or_else(|| MergeError::backend(format!("Unknown template {}", template.0)))
    }
}

impl OutputDocument for LopdfOutput {
    fn set_source_file(&mut self, path: &Path) -> Result<u32> {
        let source = match self.sources.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(SourceDocument::load(path)?),
        };

        if source.document.version > self.document.version {
            self.document.version = source.document.version.clone();
        }

        let page_count = source.page_count();
        self.current_source = Some(path.to_path_buf());
        Ok(page_count)
    }

    fn import_page(&mut self, page: u32) -> Result<TemplateId> {
        let Self {
            document,
            sources,
            current_source,
            templates,
            ..
        } = self;

        let source = current_source
            .as_ref()
            .and_then(|path| sources.get_mut(path))
            .ok_or_else(|| MergeError::backend("No source file selected"))?;

        if let Some(&template) = source.imported.get(&page) {
            return Ok(template);
        }

        let page_id = page
            .checked_sub(1)
            .and_then(|index| source.page_ids.get(index as usize))
            .copied()
            .ok_or_else(|| MergeError::page_import(page, source.path.clone()))?;

        let imported = source.import_page(document, page_id)?;
        let template = TemplateId(templates.len());
        templates.push(imported);
        source.imported.insert(page, template);

        Ok(template)
    }

    fn template_size(&self, template: TemplateId) -> Result<PageSize> {
        self.template(template).map(|t| t.size)
    }

    fn add_page(&mut self, orientation: Orientation, size: PageSize) -> Result<()> {
        let (short, long) = if size.width <= size.height {
            (size.width, size.height)
        } else {
            (size.height, size.width)
        };
        let size = match orientation {
            Orientation::Portrait => PageSize::new(short, long),
            Orientation::Landscape => PageSize::new(long, short),
        };

        self.pages.push(OutputPage {
            size,
            xobjects: Dictionary::new(),
            content: Vec::new(),
        });
        Ok(())
    }

    fn use_template(&mut self, template: TemplateId) -> Result<()> {
        let (xobject_id, matrix) = {
            let t = self.template(template)?;
            (t.xobject_id, t.matrix)
        };
        let page = self
            .pages
            .last_mut()
            .ok_or_else(|| MergeError::backend("No output page to draw on"))?;

        let name = format!("TPL{}", template.0);
        page.xobjects.set(name.as_str(), Object::Reference(xobject_id));

        let [a, b, c, d, e, f] = matrix.map(format_number);
        writeln!(page.content, "q {a} {b} {c} {d} {e} {f} cm /{name} Do Q")?;
        Ok(())
    }

    fn set_author(&mut self, author: &str) {
        set_info_field(&mut self.info, "Author", author);
    }

    fn set_creator(&mut self, creator: &str) {
        set_info_field(&mut self.info, "Creator", creator);
    }

    fn set_subject(&mut self, subject: &str) {
        set_info_field(&mut self.info, "Subject", subject);
    }

    fn set_title(&mut self, title: &str) {
        set_info_field(&mut self.info, "Title", title);
    }

    fn set_keywords(&mut self, keywords: &str) {
        set_info_field(&mut self.info, "Keywords", keywords);
    }

    fn set_display_mode(&mut self, zoom: Zoom, layout: PageLayout) {
        self.display = Some((zoom, layout));
    }

    fn output(&mut self) -> Result<Vec<u8>> {
        let mut document = self.document.clone();
        let pages_id = document.new_object_id();

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let content_id = document.add_object(Stream::new(Dictionary::new(), page.content.clone()));
            let page_id = document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page.size.width),
                    Object::Real(page.size.height),
                ],
                "Resources" => dictionary! { "XObject" => page.xobjects.clone() },
                "Contents" => content_id,
            });
            kids.push(page_id);
        }

        let first_page = kids.first().copied();
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => Object::Integer(kids.len() as i64),
                "Kids" => kids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if let Some((zoom, layout)) = self.display {
            apply_display(&mut catalog, zoom, layout, first_page);
        }
        let catalog_id = document.add_object(catalog);
        document.trailer.set("Root", catalog_id);

        let mut info = self.info.clone();
        info.set("Producer", text_string(PRODUCER));
        let info_id = document.add_object(info);
        document.trailer.set("Info", info_id);

        if self.compress {
            document.compress();
        }

        let mut bytes = Vec::new();
        document.save_to(&mut bytes)?;

        debug!(
            pages = self.pages.len(),
            bytes = bytes.len(),
            "Serialized output document"
        );
        Ok(bytes)
    }
}

/// Content of a source page, as stored or decoded.
enum PageContent<'a> {
    /// A single stream, copied with its filters.
    Encoded(&'a Stream),
    /// Several streams (or none), decoded and joined.
    Decoded(Vec<u8>),
}

fn page_content<'a>(doc: &'a Document, page: &'a Dictionary) -> lopdf::Result<PageContent<'a>> {
    let Ok(contents) = page.get(b"Contents") else {
        return Ok(PageContent::Decoded(Vec::new()));
    };

    match resolve(doc, contents) {
        Object::Stream(stream) => Ok(PageContent::Encoded(stream)),
        Object::Array(parts) => {
            let mut bytes = Vec::new();
            for part in parts {
                let stream = resolve(doc, part).as_stream()?;
                if stream.dict.has(b"Filter") {
                    bytes.extend(stream.decompressed_content()?);
                } else {
                    bytes.extend_from_slice(&stream.content);
                }
                bytes.push(b'\n');
            }
            Ok(PageContent::Decoded(bytes))
        }
        _ => Ok(PageContent::Decoded(Vec::new())),
    }
}

/// Follow a reference, leaving direct objects and dangling references as-is.
fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

/// Look up an inheritable page attribute, walking up `/Parent` links.
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(resolve(doc, value));
        }
        node = node
            .get(b"Parent")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_object(id))
            .and_then(Object::as_dict)
            .ok()?;
    }
    None
}

/// Read a rectangle as `[llx, lly, urx, ury]`.
fn read_box(doc: &Document, object: &Object) -> Option<[f32; 4]> {
    let values = object.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }

    let mut coords = [0.0f32; 4];
    for (slot, value) in coords.iter_mut().zip(values) {
        *slot = resolve(doc, value).as_float().ok()?;
    }

    let [x0, y0, x1, y1] = coords;
    Some([x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)])
}

/// `/Rotate` normalized to 0, 90, 180 or 270.
fn page_rotation(doc: &Document, page: &Dictionary) -> i64 {
    let rotate = inherited(doc, page, b"Rotate")
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0)
        .rem_euclid(360);

    if rotate % 90 == 0 { rotate } else { 0 }
}

/// Matrix mapping a page box onto an upright page at the origin.
fn placement_matrix(bbox: [f32; 4], rotation: i64) -> [f32; 6] {
    let [x0, y0, x1, y1] = bbox;
    let (w, h) = (x1 - x0, y1 - y0);

    match rotation {
        90 => [0.0, -1.0, 1.0, 0.0, -y0, w + x0],
        180 => [-1.0, 0.0, 0.0, -1.0, w + x0, h + y0],
        270 => [0.0, 1.0, -1.0, 0.0, h + y0, -x0],
        _ => [1.0, 0.0, 0.0, 1.0, -x0, -y0],
    }
}

/// Deep-copy `object` from `source` into `target`.
///
/// References are copied once per source and remapped; `/Parent` links are
/// dropped so page-tree nodes are never pulled in.
fn copy_object(
    target: &mut Document,
    source: &Document,
    copied: &mut BTreeMap<ObjectId, ObjectId>,
    object: &Object,
) -> Object {
    match object {
        Object::Reference(id) => Object::Reference(copy_reference(target, source, copied, *id)),
        Object::Array(items) => Object::Array(
            items
                .iter()
                .map(|item| copy_object(target, source, copied, item))
                .collect(),
        ),
        Object::Dictionary(dict) => Object::Dictionary(copy_dictionary(target, source, copied, dict)),
        Object::Stream(stream) => {
            let mut copy = stream.clone();
            copy.dict = copy_dictionary(target, source, copied, &stream.dict);
            Object::Stream(copy)
        }
        other => other.clone(),
    }
}

fn copy_dictionary(
    target: &mut Document,
    source: &Document,
    copied: &mut BTreeMap<ObjectId, ObjectId>,
    dict: &Dictionary,
) -> Dictionary {
    let mut copy = Dictionary::new();
    for (key, value) in dict.iter() {
        if key.as_slice() == b"Parent" {
            continue;
        }
        copy.set(key.clone(), copy_object(target, source, copied, value));
    }
    copy
}

fn copy_reference(
    target: &mut Document,
    source: &Document,
    copied: &mut BTreeMap<ObjectId, ObjectId>,
    id: ObjectId,
) -> ObjectId {
    if let Some(&existing) = copied.get(&id) {
        return existing;
    }

    // Reserve the id first so reference cycles resolve to it.
    let new_id = target.new_object_id();
    copied.insert(id, new_id);

    let object = match source.get_object(id) {
        Ok(object) => copy_object(target, source, copied, object),
        Err(_) => Object::Null,
    };
    target.objects.insert(new_id, object);
    new_id
}

/// Format a content-stream number without trailing zeros.
fn format_number(value: f32) -> String {
    let formatted = format!("{value:.4}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}
