//! File-system and stream plumbing for the merger.

mod reader;
mod sink;
mod temp;
mod writer;

pub use reader::PdfReader;
pub use sink::{Disposition, HttpSink, ResponseSink, WriterSink};
pub use temp::{TEMP_FILE_PREFIX, TempFiles};
pub use writer::PdfWriter;
