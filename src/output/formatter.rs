//! Status message formatting.
//!
//! Every line goes to stderr: stdout is reserved for PDF bytes in the
//! `string`, `browser` and `download` modes.
//!
//! # Examples
//!
//! ```
//! use pdfmerger::output::OutputFormatter;
//!
//! let formatter = OutputFormatter::new(false, false);
//! formatter.info("Merging 3 source(s)...");
//! formatter.success("Successfully created newfile.pdf");
//! ```

use std::io::{self, IsTerminal};

/// Level of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Informational message.
    Info,
    /// Success message.
    Success,
    /// Warning message.
    Warning,
    /// Verbose-only message.
    Debug,
}

impl MessageLevel {
    fn prefix(&self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "✓ ",
            Self::Warning => "⚠ ",
            Self::Debug => "→ ",
        }
    }

    fn color(&self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "\x1b[32m",
            Self::Warning => "\x1b[33m",
            Self::Debug => "\x1b[36m",
        }
    }
}

/// Status printer honouring `--quiet` and `--verbose`.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    quiet: bool,
    verbose: bool,
    colored: bool,
}

impl OutputFormatter {
    /// Create a formatter; quiet wins over verbose.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose: verbose && !quiet,
            colored: Self::should_use_color(),
        }
    }

    fn should_use_color() -> bool {
        io::stderr().is_terminal() && std::env::var("TERM").is_ok()
    }

    /// Informational line; suppressed when quiet.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.print(MessageLevel::Info, message);
        }
    }

    /// Success line; suppressed when quiet.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.print(MessageLevel::Success, message);
        }
    }

    /// Warning line; always shown.
    pub fn warning(&self, message: &str) {
        self.print(MessageLevel::Warning, message);
    }

    /// Verbose-only line.
    pub fn debug(&self, message: &str) {
        if self.verbose {
            self.print(MessageLevel::Debug, message);
        }
    }

    /// Section header; suppressed when quiet.
    pub fn section(&self, title: &str) {
        if !self.quiet {
            eprintln!("\n{title}");
        }
    }

    /// Indented `label: value` line; verbose only.
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbose {
            eprintln!("  {label}: {value}");
        }
    }

    /// Numbered list entry; suppressed when quiet.
    pub fn list_item(&self, index: usize, message: &str) {
        if !self.quiet {
            eprintln!("  {index}. {message}");
        }
    }

    /// Blank line; suppressed when quiet.
    pub fn blank_line(&self) {
        if !self.quiet {
            eprintln!();
        }
    }

    /// Whether non-error output is shown.
    pub fn should_print(&self) -> bool {
        !self.quiet
    }

    /// Whether verbose output is shown.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Render a message as it would be printed.
    pub fn format(&self, level: MessageLevel, message: &str) -> String {
        let prefix = level.prefix();
        let color = level.color();

        if self.colored && !color.is_empty() {
            format!("{color}{prefix}{message}\x1b[0m")
        } else {
            format!("{prefix}{message}")
        }
    }

    fn print(&self, level: MessageLevel, message: &str) {
        eprintln!("{}", self.format(level, message));
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}
