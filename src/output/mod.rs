//! User-facing status output for the `pdfmerger` binary.

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::config::MergeJob;
use crate::utils::format_file_size;

/// List the sources of a job before merging.
///
/// Metadata and display settings are shown in verbose mode only.
pub fn display_job_summary(formatter: &OutputFormatter, job: &MergeJob) {
    formatter.info(&format!("Merging {} source(s)...", job.sources.len()));
    for (index, source) in job.sources.iter().enumerate() {
        formatter.list_item(index + 1, &format!("{} ({})", source.path.display(), source.pages));
    }

    if formatter.is_verbose() {
        formatter.detail("Mode", job.mode.as_str());
        formatter.detail("Output", &job.output.display().to_string());
        formatter.detail("Zoom", &job.display.zoom.to_string());
        formatter.detail("Layout", &String::from(job.display.layout));
        if !job.metadata.is_empty() {
            formatter.detail("Metadata", "Set");
        }
    }
}

/// Report a file written in `file` mode.
pub fn display_file_written(formatter: &OutputFormatter, job: &MergeJob, size: Option<u64>) {
    let message = match size {
        Some(size) => format!(
            "Successfully created {} ({})",
            job.output.display(),
            format_file_size(size)
        ),
        None => format!("Successfully created {}", job.output.display()),
    };
    formatter.success(&message);
}
