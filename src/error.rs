//! Error types for pdfmerger.
//!
//! Every fallible operation in the crate returns [`MergeError`]. Errors are
//! reported to the caller of the operation that detected them and are never
//! retried internally.
//!
//! # Error Categories
//!
//! - **Registration errors**: missing source files, bad page selections,
//!   temporary files that could not be staged
//! - **Merge errors**: nothing to merge, unreadable sources, pages that do not
//!   exist in their source
//! - **Output errors**: the assembled document could not be delivered

use std::io;
use std::path::PathBuf;

use crate::config::OutputMode;

/// Result type alias for pdfmerger operations.
pub type Result<T> = std::result::Result<T, MergeError>;

/// Problems found while parsing a page selection such as `"1,3,5-9"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageRangeError {
    /// A `start-end` token whose start page is after its end page.
    #[error("Starting page '{start}' is greater than ending page '{end}'")]
    StartAfterEnd {
        /// First page of the range.
        start: u32,
        /// Last page of the range.
        end: u32,
    },

    /// A token that is neither a page number nor a `start-end` range.
    #[error("Malformed page selection token '{token}': {reason}")]
    Malformed {
        /// The offending token, whitespace already stripped.
        token: String,
        /// Why the token was rejected.
        reason: &'static str,
    },

    /// An expression that expands to more pages than a PDF can hold.
    #[error("Page selection expands to {pages} pages, more than the limit of {limit}")]
    TooManyPages {
        /// Pages the expression would expand to.
        pages: u64,
        /// Highest supported page count.
        limit: u32,
    },
}

/// Main error type for pdfmerger operations.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// A registered source path does not exist.
    #[error("Could not locate PDF on '{}'", path.display())]
    SourceNotFound {
        /// Path that was registered.
        path: PathBuf,
    },

    /// The page selection string could not be parsed.
    #[error("Invalid page selection: {0}")]
    InvalidRange(#[from] PageRangeError),

    /// `merge` was called before any source was registered.
    #[error("No PDFs to merge")]
    NoSources,

    /// A selected page does not exist in its source document.
    #[error(
        "Could not load page '{page}' in PDF '{}'. Check that the page exists",
        path.display()
    )]
    PageImport {
        /// 1-based page number that was requested.
        page: u32,
        /// Source document the page was requested from.
        path: PathBuf,
    },

    /// A source could not be opened as a PDF at merge time.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", path.display())]
    SourceLoad {
        /// Path of the source document.
        path: PathBuf,
        /// Reason reported by the PDF parser.
        reason: String,
    },

    /// In-memory PDF bytes could not be staged in a temporary file.
    #[error("Unable to create temporary file: {source}")]
    TempFile {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The assembled document could not be delivered to its sink.
    #[error("Error outputting PDF to '{mode}': {reason}")]
    Output {
        /// Output mode that was requested.
        mode: OutputMode,
        /// What went wrong while writing.
        reason: String,
    },

    /// Invalid configuration or manifest.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// The page-import backend was driven out of order or hit unreadable content.
    #[error("PDF backend error: {message}")]
    Backend {
        /// What the backend could not do.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error raised by the PDF library while building the output.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
}

impl MergeError {
    /// Create a SourceNotFound error.
    pub fn source_not_found(path: impl Into<PathBuf>) -> Self {
        Self::SourceNotFound { path: path.into() }
    }

    /// Create a PageImport error.
    pub fn page_import(page: u32, path: impl Into<PathBuf>) -> Self {
        Self::PageImport {
            page,
            path: path.into(),
        }
    }

    /// Create a SourceLoad error.
    pub fn source_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::SourceLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an Output error for the given mode.
    pub fn output(mode: OutputMode, reason: impl ToString) -> Self {
        Self::Output {
            mode,
            reason: reason.to_string(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a Backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SourceNotFound { .. } => 2,
            Self::InvalidRange(_) => 1,
            Self::NoSources => 1,
            Self::PageImport { .. } => 3,
            Self::SourceLoad { .. } => 3,
            Self::TempFile { .. } => 5,
            Self::Output { .. } => 5,
            Self::InvalidConfig { .. } => 1,
            Self::Backend { .. } => 6,
            Self::Io(_) => 5,
            Self::Pdf(_) => 6,
        }
    }
}
