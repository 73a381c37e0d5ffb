//! Page selection and merge orchestration.

pub mod merger;
pub mod pages;

pub use merger::{MergeOutput, PdfMerger, SourceEntry};
pub use pages::{MAX_PAGE_NUMBER, PageSelection, PageSpan, parse_page_range, parse_page_spans};
