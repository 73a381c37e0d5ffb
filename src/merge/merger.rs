//! Merge orchestration.
//!
//! [`PdfMerger`] keeps an ordered list of sources with their page selections
//! and, on [`PdfMerger::merge`], replays them through a page-import backend:
//! every selected page becomes one output page of the same size and
//! orientation. The finished document is then returned as bytes, written to
//! a file or streamed to a [`ResponseSink`].

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::backend::{LopdfBackend, OutputDocument, PdfBackend};
use crate::config::{
    DEFAULT_OUTPUT_PATH, DisplayPreferences, DocumentMetadata, OutputMode, PageLayout, Zoom,
};
use crate::error::{MergeError, Result};
use crate::io::{Disposition, PdfReader, PdfWriter, ResponseSink, TempFiles, WriterSink};
use crate::merge::pages::PageSelection;

/// One registered source and the pages taken from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    path: PathBuf,
    selection: PageSelection,
}

impl SourceEntry {
    /// Path of the source document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pages taken from the source, in merge order.
    pub fn selection(&self) -> &PageSelection {
        &self.selection
    }
}

/// What [`PdfMerger::merge`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutput {
    /// The document itself (`string` mode).
    Bytes(Vec<u8>),
    /// The document went to a file or a response sink.
    Delivered,
}

impl MergeOutput {
    /// The document bytes, if they were returned to the caller.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::Delivered => None,
        }
    }

    /// Whether the document was handed to a file or sink.
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Merges selected pages of several PDFs into one document.
///
/// # Examples
///
/// ```no_run
/// use pdfmerger::PdfMerger;
///
/// # fn example() -> pdfmerger::Result<()> {
/// let mut merger = PdfMerger::new();
/// merger
///     .add_source("one.pdf", "1, 3, 4")?
///     .add_source("two.pdf", "1-2")?
///     .add_source("three.pdf", "all")?;
/// merger.set_author("sample author").set_title("Merged");
///
/// merger.merge("file", "samplepdfs/TEST-ALL.pdf")?;
/// # Ok(())
/// # }
/// ```
pub struct PdfMerger<B: PdfBackend = LopdfBackend> {
    backend: B,
    sources: Vec<SourceEntry>,
    temp_files: TempFiles,
    metadata: DocumentMetadata,
    display: DisplayPreferences,
    response_sink: Box<dyn ResponseSink + Send>,
}

impl PdfMerger<LopdfBackend> {
    /// Create a merger using the lopdf backend.
    pub fn new() -> Self {
        Self::with_backend(LopdfBackend::new())
    }
}

impl Default for PdfMerger<LopdfBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: PdfBackend> fmt::Debug for PdfMerger<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfMerger")
            .field("sources", &self.sources)
            .field("temp_files", &self.temp_files)
            .field("metadata", &self.metadata)
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}

impl<B: PdfBackend> PdfMerger<B> {
    /// Create a merger that imports pages through `backend`.
    ///
    /// Streamed output goes to standard output until
    /// [`set_response_sink`](Self::set_response_sink) is called.
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            sources: Vec::new(),
            temp_files: TempFiles::new(),
            metadata: DocumentMetadata::default(),
            display: DisplayPreferences::default(),
            response_sink: Box::new(WriterSink::stdout()),
        }
    }

    /// Register a source file and the pages to take from it.
    ///
    /// `selection` is `"all"` or an expression such as `"1,3,5-9"`.
    ///
    /// # Errors
    ///
    /// - [`MergeError::SourceNotFound`] if `path` does not exist
    /// - [`MergeError::InvalidRange`] if `selection` cannot be parsed
    ///
    /// The source list is unchanged on error.
    pub fn add_source(&mut self, path: impl AsRef<Path>, selection: &str) -> Result<&mut Self> {
        let path = path.as_ref();
        PdfReader::check_path_exists(path)?;
        let selection: PageSelection = selection.parse()?;
        self.push_source(path, selection);
        Ok(self)
    }

    /// Register a source file with an already parsed selection.
    pub fn add_selection(
        &mut self,
        path: impl AsRef<Path>,
        selection: PageSelection,
    ) -> Result<&mut Self> {
        let path = path.as_ref();
        PdfReader::check_path_exists(path)?;
        self.push_source(path, selection);
        Ok(self)
    }

    /// Register an in-memory PDF.
    ///
    /// The bytes are staged in a temporary file that lives until
    /// [`cleanup_temp_files`](Self::cleanup_temp_files) is called or the
    /// merger is dropped.
    ///
    /// # Errors
    ///
    /// - [`MergeError::InvalidRange`] if `selection` cannot be parsed
    /// - [`MergeError::TempFile`] if the bytes cannot be staged
    pub fn add_source_bytes(&mut self, bytes: &[u8], selection: &str) -> Result<&mut Self> {
        let selection: PageSelection = selection.parse()?;
        let path = self.temp_files.stage(bytes)?;
        self.add_selection(path, selection)
    }

    fn push_source(&mut self, path: &Path, selection: PageSelection) {
        debug!(path = %path.display(), %selection, "Registered source");
        self.sources.push(SourceEntry {
            path: path.to_path_buf(),
            selection,
        });
    }

    /// Registered sources in merge order.
    pub fn sources(&self) -> &[SourceEntry] {
        &self.sources
    }

    /// Delete every temporary file staged by [`add_source_bytes`](Self::add_source_bytes).
    ///
    /// Safe to call repeatedly. Sources backed by deleted files stay
    /// registered and fail to load if merged afterwards.
    pub fn cleanup_temp_files(&mut self) {
        self.temp_files.cleanup();
    }

    /// Paths of the temporary files currently staged.
    pub fn temp_files(&self) -> impl Iterator<Item = &Path> {
        self.temp_files.paths()
    }

    /// Set the document author.
    pub fn set_author(&mut self, author: impl Into<String>) -> &mut Self {
        self.metadata.author = Some(author.into());
        self
    }

    /// Set the document creator.
    pub fn set_creator(&mut self, creator: impl Into<String>) -> &mut Self {
        self.metadata.creator = Some(creator.into());
        self
    }

    /// Set the document subject.
    pub fn set_subject(&mut self, subject: impl Into<String>) -> &mut Self {
        self.metadata.subject = Some(subject.into());
        self
    }

    /// Set the document title.
    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.metadata.title = Some(title.into());
        self
    }

    /// Set the document keywords.
    pub fn set_keywords(&mut self, keywords: impl Into<String>) -> &mut Self {
        self.metadata.keywords = Some(keywords.into());
        self
    }

    /// Replace all metadata at once.
    pub fn set_metadata(&mut self, metadata: DocumentMetadata) -> &mut Self {
        self.metadata = metadata;
        self
    }

    /// Set the initial zoom, e.g. `75.0_f32` or [`Zoom::FullPage`].
    ///
    /// A percentage that is not finite or not above zero is ignored and the
    /// previous zoom is kept.
    pub fn set_zoom(&mut self, zoom: impl Into<Zoom>) -> &mut Self {
        let zoom = zoom.into();
        if zoom.is_valid() {
            self.display.zoom = zoom;
        } else {
            warn!(%zoom, "Ignoring invalid zoom");
        }
        self
    }

    /// Set the page layout.
    pub fn set_page_layout(&mut self, layout: PageLayout) -> &mut Self {
        self.display.layout = layout;
        self
    }

    /// Install the sink that receives `browser` and `download` output.
    pub fn set_response_sink(&mut self, sink: impl ResponseSink + Send + 'static) -> &mut Self {
        self.response_sink = Box::new(sink);
        self
    }

    /// Author set for the output, if any.
    pub fn author(&self) -> Option<&str> {
        self.metadata.author.as_deref()
    }

    /// Creator set for the output, if any.
    pub fn creator(&self) -> Option<&str> {
        self.metadata.creator.as_deref()
    }

    /// Subject set for the output, if any.
    pub fn subject(&self) -> Option<&str> {
        self.metadata.subject.as_deref()
    }

    /// Title set for the output, if any.
    pub fn title(&self) -> Option<&str> {
        self.metadata.title.as_deref()
    }

    /// Keywords set for the output, if any.
    pub fn keywords(&self) -> Option<&str> {
        self.metadata.keywords.as_deref()
    }

    /// All metadata set for the output.
    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// Initial zoom of the output.
    pub fn zoom(&self) -> Zoom {
        self.display.zoom
    }

    /// Page layout of the output.
    pub fn page_layout(&self) -> PageLayout {
        self.display.layout
    }

    /// Merge the registered sources and deliver the result.
    ///
    /// `mode` is resolved case-insensitively (see [`OutputMode::resolve`]);
    /// unknown modes stream inline. `output_path` is the file written in
    /// `file` mode and supplies the file name announced for streamed modes.
    ///
    /// # Errors
    ///
    /// - [`MergeError::NoSources`] if nothing was registered
    /// - [`MergeError::SourceLoad`] if a source cannot be parsed
    /// - [`MergeError::PageImport`] if a selected page does not exist
    /// - [`MergeError::Output`] if the document cannot be serialized or delivered
    ///
    /// Nothing is written unless the whole document was assembled.
    pub fn merge(&mut self, mode: &str, output_path: impl AsRef<Path>) -> Result<MergeOutput> {
        self.merge_to(OutputMode::resolve(mode), output_path)
    }

    /// [`merge`](Self::merge) with an already resolved mode.
    pub fn merge_to(
        &mut self,
        mode: OutputMode,
        output_path: impl AsRef<Path>,
    ) -> Result<MergeOutput> {
        if self.sources.is_empty() {
            return Err(MergeError::NoSources);
        }

        let output_path = output_path.as_ref();
        let (mut document, page_count) = self.assemble()?;
        let bytes = document
            .output()
            .map_err(|e| MergeError::output(mode, e))?;
        let byte_count = bytes.len();

        let result = match Disposition::for_mode(mode) {
            Some(disposition) => {
                let file_name = output_path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());
                self.response_sink
                    .deliver(&bytes, &file_name, disposition)
                    .map_err(|e| MergeError::output(mode, e))?;
                MergeOutput::Delivered
            }
            None if mode == OutputMode::File => {
                PdfWriter::write(&bytes, output_path).map_err(|e| MergeError::output(mode, e))?;
                MergeOutput::Delivered
            }
            None => MergeOutput::Bytes(bytes),
        };

        info!(
            sources = self.sources.len(),
            pages = page_count,
            bytes = byte_count,
            %mode,
            "Merged PDF"
        );
        Ok(result)
    }

    /// Replay every source through a fresh backend document.
    fn assemble(&self) -> Result<(B::Document, usize)> {
        let mut document = self.backend.create_document();
        let mut page_count = 0;

        for source in &self.sources {
            let available = document.set_source_file(&source.path)?;

            for page in source.selection.pages(available) {
                let template = document.import_page(page)?;
                let size = document.template_size(template)?;
                document.add_page(size.orientation(), size)?;
                document.use_template(template)?;
                page_count += 1;
            }

            debug!(
                path = %source.path.display(),
                available,
                selection = %source.selection,
                "Imported source"
            );
        }

        let metadata = &self.metadata;
        if let Some(author) = &metadata.author {
            document.set_author(author);
        }
        if let Some(creator) = &metadata.creator {
            document.set_creator(creator);
        }
        if let Some(subject) = &metadata.subject {
            document.set_subject(subject);
        }
        if let Some(title) = &metadata.title {
            document.set_title(title);
        }
        if let Some(keywords) = &metadata.keywords {
            document.set_keywords(keywords);
        }
        document.set_display_mode(self.display.zoom, self.display.layout);

        Ok((document, page_count))
    }
}
