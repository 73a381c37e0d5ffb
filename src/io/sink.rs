//! Response sinks for streamed output.
//!
//! `browser` and `download` merges hand the finished document to a
//! [`ResponseSink`] instead of writing a file. [`WriterSink`] passes the raw
//! bytes through; [`HttpSink`] prefixes them with an HTTP header block.

use std::fmt;
use std::io::{self, Write};

use crate::config::OutputMode;

/// How a streamed document should be presented by the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Display in place.
    Inline,
    /// Save as a file.
    Attachment,
}

impl Disposition {
    /// Disposition for a streamed output mode, `None` for the others.
    pub fn for_mode(mode: OutputMode) -> Option<Self> {
        match mode {
            OutputMode::Inline => Some(Self::Inline),
            OutputMode::Download => Some(Self::Attachment),
            OutputMode::File | OutputMode::String => None,
        }
    }

    /// MIME type announced for this disposition.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Inline => "application/pdf",
            Self::Attachment => "application/x-download",
        }
    }

    /// Disposition keyword used in `Content-Disposition`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Attachment => "attachment",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver of a finished document.
pub trait ResponseSink {
    /// Deliver `bytes` under `file_name`.
    fn deliver(&mut self, bytes: &[u8], file_name: &str, disposition: Disposition)
    -> io::Result<()>;
}

/// Writes the document bytes unchanged.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<io::Stdout> {
    /// Sink writing to the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ResponseSink for WriterSink<W> {
    fn deliver(&mut self, bytes: &[u8], _file_name: &str, _disposition: Disposition)
    -> io::Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()
    }
}

/// Writes an HTTP/1.1 response: header block, then the document.
///
/// Only one response can be sent; later deliveries fail because the headers
/// are already out.
#[derive(Debug)]
pub struct HttpSink<W: Write> {
    writer: W,
    headers_sent: bool,
}

impl<W: Write> HttpSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            headers_sent: false,
        }
    }

    /// Whether a response has already been written.
    pub fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    /// Recover the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl HttpSink<io::Stdout> {
    /// HTTP sink on the process's standard output, as used by CGI scripts.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ResponseSink for HttpSink<W> {
    fn deliver(&mut self, bytes: &[u8], file_name: &str, disposition: Disposition)
    -> io::Result<()> {
        if self.headers_sent {
            return Err(io::Error::other(
                "Some data has already been output, can't send PDF file",
            ));
        }
        self.headers_sent = true;

        let file_name = file_name.replace(['"', '\r', '\n'], "");
        write!(
            self.writer,
            "HTTP/1.1 200 OK\r\n\
             Content-Type: {}\r\n\
             Content-Disposition: {}; filename=\"{}\"\r\n\
             Content-Length: {}\r\n\
             Cache-Control: private, max-age=0, must-revalidate\r\n\
             Pragma: public\r\n\
             \r\n",
            disposition.content_type(),
            disposition,
            file_name,
            bytes.len(),
        )?;
        self.writer.write_all(bytes)?;
        self.writer.flush()
    }
}
