//! pdfmerger - merge selected pages of several PDFs into one document.
//!
//! Sources are registered in order, each with a page selection such as
//! `"1, 3, 4"`, `"12-14"` or `"all"`. Merging imports every selected page
//! into a new document, one output page per selected page with the source
//! page's size and orientation, then applies the document metadata and
//! display preferences and delivers the result:
//!
//! - `string`: returned as bytes
//! - `file`: written to disk
//! - `browser` / `download`: streamed to a [`io::ResponseSink`]
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerger::{MergeOutput, PdfMerger};
//!
//! # fn example() -> pdfmerger::Result<()> {
//! let mut merger = PdfMerger::new();
//! merger
//!     .add_source("one.pdf", "1, 3, 4")?
//!     .add_source("two.pdf", "1-2")?
//!     .add_source("three.pdf", "all")?;
//!
//! merger
//!     .set_author("sample author")
//!     .set_title("Quarterly report")
//!     .set_zoom(pdfmerger::Zoom::FullPage);
//!
//! if let MergeOutput::Bytes(bytes) = merger.merge("string", "merged.pdf")? {
//!     println!("{} bytes", bytes.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! In-memory documents are staged in temporary files:
//!
//! ```no_run
//! # fn example(upload: Vec<u8>) -> pdfmerger::Result<()> {
//! let mut merger = pdfmerger::PdfMerger::new();
//! merger.add_source_bytes(&upload, "all")?;
//! merger.merge("file", "out/merged.pdf")?;
//! merger.cleanup_temp_files();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod utils;

pub use backend::{LopdfBackend, OutputDocument, PdfBackend};
pub use config::{DisplayPreferences, DocumentMetadata, MergeJob, OutputMode, PageLayout, Zoom};
pub use error::{MergeError, PageRangeError, Result};
pub use merge::{MergeOutput, PageSelection, PdfMerger, parse_page_range};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
