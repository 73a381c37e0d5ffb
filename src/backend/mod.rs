//! Page-import backends.
//!
//! The merger never touches PDF objects itself. It drives an
//! [`OutputDocument`] obtained from a [`PdfBackend`]: select a source file,
//! import a page as a reusable template, add an output page, draw the template
//! on it, and finally serialize. [`LopdfBackend`] is the default
//! implementation.

pub mod info;
pub mod lopdf_backend;

pub use lopdf_backend::{LopdfBackend, LopdfOutput, PRODUCER};

use std::path::Path;

use crate::config::{PageLayout, Zoom};
use crate::error::Result;

/// Page orientation of an output page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Taller than wide (or square).
    Portrait,
    /// Wider than tall.
    Landscape,
}

/// Width and height of a page or template, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    /// Width in points.
    pub width: f32,
    /// Height in points.
    pub height: f32,
}

impl PageSize {
    /// Create a page size.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Orientation matching these dimensions.
    ///
    /// Square pages are [`Orientation::Portrait`].
    pub fn orientation(&self) -> Orientation {
        if self.width > self.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// Handle to a page imported into an [`OutputDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(pub usize);

/// A document under assembly.
///
/// Calls arrive in merge order: `set_source_file`, then for each selected
/// page `import_page`, `template_size`, `add_page` and `use_template`; then
/// the metadata setters and `set_display_mode`; finally `output`.
pub trait OutputDocument {
    /// Select the source for subsequent imports and return its page count.
    fn set_source_file(&mut self, path: &Path) -> Result<u32>;

    /// Import a 1-based page of the current source.
    ///
    /// Fails with [`crate::MergeError::PageImport`] when the page does not exist.
    fn import_page(&mut self, page: u32) -> Result<TemplateId>;

    /// Size of an imported page, rotation already applied.
    fn template_size(&self, template: TemplateId) -> Result<PageSize>;

    /// Append a blank output page and make it current.
    fn add_page(&mut self, orientation: Orientation, size: PageSize) -> Result<()>;

    /// Draw an imported page on the current output page.
    fn use_template(&mut self, template: TemplateId) -> Result<()>;

    /// Set the document author.
    fn set_author(&mut self, author: &str);

    /// Set the document creator.
    fn set_creator(&mut self, creator: &str);

    /// Set the document subject.
    fn set_subject(&mut self, subject: &str);

    /// Set the document title.
    fn set_title(&mut self, title: &str);

    /// Set the document keywords.
    fn set_keywords(&mut self, keywords: &str);

    /// Set how viewers should open the document.
    fn set_display_mode(&mut self, zoom: Zoom, layout: PageLayout);

    /// Serialize the assembled document.
    fn output(&mut self) -> Result<Vec<u8>>;
}

/// Factory for fresh output documents, one per merge.
pub trait PdfBackend {
    /// Document type produced by this backend.
    type Document: OutputDocument;

    /// Create an empty output document.
    fn create_document(&self) -> Self::Document;
}
