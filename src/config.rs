//! Configuration module for pdfmerger.
//!
//! This module holds the typed values that steer a merge:
//! - Output mode resolution (`browser`, `download`, `file`, `string`)
//! - Document metadata applied to the merged file
//! - Display preferences (zoom and page layout)
//! - JSON merge manifests describing a complete job
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerger::config::MergeJob;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let job = MergeJob::from_path(Path::new("job.json"))?;
//! job.validate()?;
//! let mut merger = job.to_merger()?;
//! merger.merge_to(job.mode, &job.output)?;
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::backend::PdfBackend;
use crate::error::{MergeError, Result};
use crate::merge::PdfMerger;

/// Output path used when the caller does not name one.
pub const DEFAULT_OUTPUT_PATH: &str = "newfile.pdf";

/// Where the merged document is delivered.
///
/// Resolution from user input is case-insensitive and never fails: unknown
/// tokens fall back to [`OutputMode::Inline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutputMode {
    /// Stream to the response channel for in-place display.
    #[default]
    Inline,
    /// Stream to the response channel as an attachment.
    Download,
    /// Write to a file on disk.
    File,
    /// Return the document as bytes.
    String,
}

impl OutputMode {
    /// Resolve a mode token such as `"FILE"` or `"browser"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfmerger::config::OutputMode;
    ///
    /// assert_eq!(OutputMode::resolve("File"), OutputMode::File);
    /// assert_eq!(OutputMode::resolve("pdf"), OutputMode::Inline);
    /// ```
    pub fn resolve(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "download" => Self::Download,
            "file" => Self::File,
            "string" => Self::String,
            _ => Self::Inline,
        }
    }

    /// The canonical token for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "browser",
            Self::Download => "download",
            Self::File => "file",
            Self::String => "string",
        }
    }

    /// Whether this mode hands the bytes to a response sink.
    pub fn is_streamed(&self) -> bool {
        matches!(self, Self::Inline | Self::Download)
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for OutputMode {
    fn from(token: &str) -> Self {
        Self::resolve(token)
    }
}

impl From<String> for OutputMode {
    fn from(token: String) -> Self {
        Self::resolve(&token)
    }
}

impl From<OutputMode> for String {
    fn from(mode: OutputMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Initial zoom of the merged document in a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ZoomValue", into = "ZoomValue")]
pub enum Zoom {
    /// Fit the whole page in the window.
    FullPage,
    /// Fit the page width in the window.
    FullWidth,
    /// Actual size.
    Real,
    /// Leave the choice to the viewer.
    Default,
    /// Explicit percentage, `100.0` being actual size.
    Percent(f32),
}

impl Default for Zoom {
    fn default() -> Self {
        Self::Percent(100.0)
    }
}

impl Zoom {
    /// Explicit percentage; must be finite and greater than zero.
    pub fn percent(percent: f32) -> Result<Self> {
        let zoom = Self::Percent(percent);
        if zoom.is_valid() {
            Ok(zoom)
        } else {
            Err(MergeError::invalid_config(format!(
                "Invalid zoom: {percent}. Percentage must be a finite number greater than 0"
            )))
        }
    }

    /// Whether a viewer can apply this zoom.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Percent(p) => p.is_finite() && *p > 0.0,
            _ => true,
        }
    }
}

impl From<f32> for Zoom {
    fn from(percent: f32) -> Self {
        Self::Percent(percent)
    }
}

impl FromStr for Zoom {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim().to_lowercase();
        match token.as_str() {
            "fullpage" => Ok(Self::FullPage),
            "fullwidth" => Ok(Self::FullWidth),
            "real" => Ok(Self::Real),
            "default" => Ok(Self::Default),
            other => {
                let percent = other.trim_end_matches('%').parse::<f32>().map_err(|_| {
                    MergeError::invalid_config(format!(
                        "Invalid zoom: {s}. Must be a number or one of: fullpage, fullwidth, real, default"
                    ))
                })?;
                Self::percent(percent)
            }
        }
    }
}

impl fmt::Display for Zoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullPage => f.write_str("fullpage"),
            Self::FullWidth => f.write_str("fullwidth"),
            Self::Real => f.write_str("real"),
            Self::Default => f.write_str("default"),
            Self::Percent(p) => write!(f, "{p}"),
        }
    }
}

/// Manifest representation of a zoom: either a number or a keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ZoomValue {
    Number(f32),
    Name(String),
}

impl TryFrom<ZoomValue> for Zoom {
    type Error = MergeError;

    fn try_from(value: ZoomValue) -> Result<Self> {
        match value {
            ZoomValue::Number(p) => Self::percent(p),
            ZoomValue::Name(name) => name.parse(),
        }
    }
}

impl From<Zoom> for ZoomValue {
    fn from(zoom: Zoom) -> Self {
        match zoom {
            Zoom::Percent(p) => Self::Number(p),
            other => Self::Name(other.to_string()),
        }
    }
}

/// Page arrangement a viewer should use when opening the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PageLayout {
    /// One page at a time.
    SinglePage,
    /// Pages in one continuous column.
    #[default]
    OneColumn,
    /// Two columns, odd pages on the left.
    TwoColumnLeft,
    /// Two columns, odd pages on the right.
    TwoColumnRight,
    /// Two pages at a time, odd pages on the left.
    TwoPageLeft,
    /// Two pages at a time, odd pages on the right.
    TwoPageRight,
    /// Leave the choice to the viewer.
    Default,
}

impl PageLayout {
    /// PDF name written to the catalog's `/PageLayout`, if any.
    pub fn pdf_name(&self) -> Option<&'static str> {
        match self {
            Self::SinglePage => Some("SinglePage"),
            Self::OneColumn => Some("OneColumn"),
            Self::TwoColumnLeft => Some("TwoColumnLeft"),
            Self::TwoColumnRight => Some("TwoColumnRight"),
            Self::TwoPageLeft => Some("TwoPageLeft"),
            Self::TwoPageRight => Some("TwoPageRight"),
            Self::Default => None,
        }
    }
}

impl FromStr for PageLayout {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "single" | "singlepage" => Ok(Self::SinglePage),
            "continuous" | "onecolumn" => Ok(Self::OneColumn),
            "two" | "twocolumnleft" => Ok(Self::TwoColumnLeft),
            "twocolumnright" => Ok(Self::TwoColumnRight),
            "twopageleft" => Ok(Self::TwoPageLeft),
            "twopageright" => Ok(Self::TwoPageRight),
            "default" => Ok(Self::Default),
            _ => Err(MergeError::invalid_config(format!(
                "Invalid page layout: {s}. Must be one of: SinglePage, OneColumn, \
                 TwoColumnLeft, TwoColumnRight, TwoPageLeft, TwoPageRight, default"
            ))),
        }
    }
}

impl TryFrom<String> for PageLayout {
    type Error = MergeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PageLayout> for String {
    fn from(layout: PageLayout) -> Self {
        layout.pdf_name().unwrap_or("default").to_string()
    }
}

/// Display hints applied once to the assembled document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayPreferences {
    /// Initial zoom.
    pub zoom: Zoom,
    /// Page layout.
    pub layout: PageLayout,
}

/// Document information applied to the merged output.
///
/// Unset fields are left at the PDF library's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentMetadata {
    /// Document author.
    pub author: Option<String>,
    /// Application that created the original content.
    pub creator: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document title.
    pub title: Option<String>,
    /// Document keywords.
    pub keywords: Option<String>,
}

impl DocumentMetadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.creator.is_none()
            && self.subject.is_none()
            && self.title.is_none()
            && self.keywords.is_none()
    }

    /// Overlay the fields set in `other` on top of `self`.
    pub fn merged_with(mut self, other: DocumentMetadata) -> Self {
        self.author = other.author.or(self.author);
        self.creator = other.creator.or(self.creator);
        self.subject = other.subject.or(self.subject);
        self.title = other.title.or(self.title);
        self.keywords = other.keywords.or(self.keywords);
        self
    }
}

fn default_pages() -> String {
    "all".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

/// One source entry of a [`MergeJob`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Path to the source PDF.
    pub path: PathBuf,
    /// Page selection, `"all"` when omitted.
    #[serde(default = "default_pages")]
    pub pages: String,
}

impl SourceSpec {
    /// Create a source spec.
    pub fn new(path: impl Into<PathBuf>, pages: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            pages: pages.into(),
        }
    }
}

/// A complete merge job, usually read from a JSON manifest.
///
/// ```json
/// {
///   "sources": [
///     { "path": "one.pdf", "pages": "1, 3, 4" },
///     { "path": "two.pdf" }
///   ],
///   "metadata": { "author": "sample author" },
///   "display": { "zoom": "fullpage", "layout": "TwoPageLeft" },
///   "mode": "file",
///   "output": "merged.pdf"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeJob {
    /// Sources in merge order.
    #[serde(default)]
    pub sources: Vec<SourceSpec>,

    /// Metadata for the output document.
    #[serde(default)]
    pub metadata: DocumentMetadata,

    /// Display preferences for the output document.
    #[serde(default)]
    pub display: DisplayPreferences,

    /// Output mode.
    #[serde(default)]
    pub mode: OutputMode,

    /// Output path, also used as the file name for streamed modes.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for MergeJob {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            metadata: DocumentMetadata::default(),
            display: DisplayPreferences::default(),
            mode: OutputMode::default(),
            output: default_output(),
        }
    }
}

impl MergeJob {
    /// Parse a job from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::InvalidConfig`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| MergeError::invalid_config(format!("Invalid merge manifest: {e}")))
    }

    /// Read a job from a JSON manifest file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            MergeError::invalid_config(format!(
                "Failed to read manifest {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&json)
    }

    /// Validate the job.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No sources are listed
    /// - The job writes to a file that is also one of its sources
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(MergeError::invalid_config("No input files specified"));
        }

        if self.mode == OutputMode::File {
            for source in &self.sources {
                if source.path == self.output {
                    return Err(MergeError::invalid_config(format!(
                        "Output file cannot be the same as an input file: {}",
                        self.output.display()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Build a merger with the default backend from this job.
    pub fn to_merger(&self) -> Result<PdfMerger> {
        let mut merger = PdfMerger::new();
        self.apply_to(&mut merger)?;
        Ok(merger)
    }

    /// Register this job's sources, metadata and display preferences.
    ///
    /// Sources are added in manifest order; the first one that fails to
    /// register aborts the whole call.
    pub fn apply_to<B: PdfBackend>(&self, merger: &mut PdfMerger<B>) -> Result<()> {
        for source in &self.sources {
            merger.add_source(&source.path, &source.pages)?;
        }

        merger
            .set_metadata(self.metadata.clone())
            .set_zoom(self.display.zoom)
            .set_page_layout(self.display.layout);

        Ok(())
    }
}
