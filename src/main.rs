//! pdfmerger - merge selected pages of several PDF files into one document.

mod cli;

use anyhow::{Context, bail};
use clap::Parser;
use std::io::Write;
use std::process;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use pdfmerger::config::OutputMode;
use pdfmerger::io::HttpSink;
use pdfmerger::output::{OutputFormatter, display_file_written, display_job_summary};
use pdfmerger::{MergeError, MergeOutput};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        process::exit(exit_code(&err));
    }
}

/// Log to stderr so `string` and streamed modes keep stdout for the PDF.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<MergeError>()
        .map(MergeError::exit_code)
        .unwrap_or(1)
}

/// Main application logic.
async fn run(cli: Cli) -> anyhow::Result<()> {
    let formatter = OutputFormatter::new(cli.quiet, cli.verbose);
    let job = cli.to_job()?;

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfmerger::NAME, pdfmerger::VERSION));
        display_job_summary(&formatter, &job);
        formatter.blank_line();
    }

    let http_headers = cli.http_headers;
    let mode = job.mode;
    if http_headers && !mode.is_streamed() {
        formatter.warning(&format!("--http-headers has no effect in {mode} mode"));
    }
    if let Some(secs) = cli.timeout {
        formatter.debug(&format!("Timeout: {secs}s"));
    }
    let output = job.output.clone();
    let merge_job = job.clone();

    // lopdf is synchronous; keep the runtime free for the timeout.
    let task = tokio::task::spawn_blocking(move || {
        let mut merger = merge_job.to_merger()?;
        if http_headers {
            merger.set_response_sink(HttpSink::stdout());
        }
        merger.merge_to(mode, &output)
    });

    let joined = match cli.timeout {
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), task).await {
            Ok(joined) => joined,
            Err(_) => bail!("Merge did not finish within {secs}s"),
        },
        None => task.await,
    };
    let result = joined.context("Merge task failed")??;

    match (mode, result) {
        (_, MergeOutput::Bytes(bytes)) => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&bytes)
                .and_then(|()| stdout.flush())
                .map_err(|e| MergeError::output(OutputMode::String, e))?;
            debug!(bytes = bytes.len(), "Wrote merged PDF to stdout");
        }
        (OutputMode::File, MergeOutput::Delivered) => {
            let size = std::fs::metadata(&job.output).map(|m| m.len()).ok();
            display_file_written(&formatter, &job, size);
        }
        (_, MergeOutput::Delivered) => {
            debug!(%mode, "Streamed merged PDF");
        }
    }

    Ok(())
}
