//! Command-line interface of the `pdfmerger` binary.

use clap::Parser;
use std::path::PathBuf;

use pdfmerger::config::{DocumentMetadata, MergeJob, OutputMode, SourceSpec};
use pdfmerger::utils::collect_paths_for_pattern;
use pdfmerger::Result;

/// Merge selected pages of several PDF files into one document.
///
/// Sources are merged in the order given. Each source may carry a page
/// selection after a colon: `report.pdf:1,3-5`. Without one, every page is
/// taken.
#[derive(Parser, Debug)]
#[command(name = "pdfmerger")]
#[command(version)]
#[command(author)]
#[command(about = "Merge selected pages of several PDF files into one document", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Source PDFs in merge order, as PATH or PATH:SELECTION
    ///
    /// PATH may be a glob pattern; every match gets the same selection.
    ///
    /// Examples:
    ///   pdfmerger one.pdf:1,3,4 two.pdf:1-2 three.pdf
    ///   pdfmerger 'chapters/*.pdf' -o book.pdf
    #[arg(value_name = "SOURCE")]
    pub sources: Vec<String>,

    /// Output file, also the file name announced when streaming
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output mode: browser, download, file or string
    ///
    /// Defaults to "file". Unknown modes stream the PDF inline.
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Read sources, metadata and display settings from a JSON manifest
    ///
    /// Command-line values override the manifest; command-line sources are
    /// merged after the manifest's sources.
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Set author metadata
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Set creator metadata
    #[arg(long, value_name = "TEXT")]
    pub creator: Option<String>,

    /// Set subject metadata
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Set title metadata
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Set keywords metadata
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    /// Initial zoom: a percentage or fullpage, fullwidth, real, default
    #[arg(long, value_name = "ZOOM")]
    pub zoom: Option<String>,

    /// Page layout: SinglePage, OneColumn, TwoColumnLeft, TwoColumnRight,
    /// TwoPageLeft, TwoPageRight or default
    #[arg(long, value_name = "LAYOUT")]
    pub layout: Option<String>,

    /// Prefix streamed output with HTTP response headers
    #[arg(long)]
    pub http_headers: bool,

    /// Abort if the merge takes longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Verbose output - show every source and the settings applied
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Build the merge job described by the manifest and the flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read, a glob pattern is
    /// invalid or matches nothing, zoom or layout are unknown, or the
    /// resulting job fails validation.
    pub fn to_job(&self) -> Result<MergeJob> {
        let mut job = match &self.manifest {
            Some(path) => MergeJob::from_path(path)?,
            None => MergeJob {
                mode: OutputMode::File,
                ..MergeJob::default()
            },
        };

        for source in &self.sources {
            job.sources.extend(expand_source(source)?);
        }

        job.metadata = job.metadata.merged_with(self.metadata());

        if let Some(zoom) = &self.zoom {
            job.display.zoom = zoom.parse()?;
        }
        if let Some(layout) = &self.layout {
            job.display.layout = layout.parse()?;
        }
        if let Some(mode) = &self.mode {
            job.mode = OutputMode::resolve(mode);
        }
        if let Some(output) = &self.output {
            job.output = output.clone();
        }

        job.validate()?;
        Ok(job)
    }

    fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            author: self.author.clone(),
            creator: self.creator.clone(),
            subject: self.subject.clone(),
            title: self.title.clone(),
            keywords: self.keywords.clone(),
        }
    }
}

/// Split `PATH:SELECTION` into its parts.
///
/// The suffix only counts as a selection when it looks like one, so paths
/// containing colons are left alone.
pub fn split_source(arg: &str) -> (&str, &str) {
    if let Some((path, suffix)) = arg.rsplit_once(':')
        && !path.is_empty()
        && is_selection(suffix)
    {
        return (path, suffix);
    }

    (arg, "all")
}

fn is_selection(text: &str) -> bool {
    let text = text.trim();
    text.eq_ignore_ascii_case("all")
        || (!text.is_empty()
            && text
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, ',' | '-' | ' ')))
}

fn expand_source(arg: &str) -> Result<Vec<SourceSpec>> {
    let (pattern, selection) = split_source(arg);
    let paths = collect_paths_for_pattern(pattern)?;

    Ok(paths
        .into_iter()
        .map(|path| SourceSpec::new(path, selection))
        .collect())
}
