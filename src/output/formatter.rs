//! Message formatting and display.
//!
//! Status messages go to stdout, warnings and errors to stderr. Quiet mode
//! keeps only warnings and errors; verbose mode adds debug lines and
//! details.
//!
//! # Examples
//!
//! ```
//! use pdfbuilder::output::formatter::OutputFormatter;
//!
//! let formatter = OutputFormatter::new(false, false);
//! formatter.info("Adding files...");
//! formatter.success("Saved album.pdf");
//! ```

use crate::config::Config;
use std::io::{self, IsTerminal};

/// Level of output message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Informational message.
    Info,
    /// Success message.
    Success,
    /// Warning message.
    Warning,
    /// Error message.
    Error,
    /// Debug/verbose message.
    Debug,
}

impl MessageLevel {
    fn prefix(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "✓ ",
            Self::Warning => "⚠ ",
            Self::Error => "✗ ",
            Self::Debug => "→ ",
        }
    }

    fn color(self) -> Option<&'static str> {
        match self {
            Self::Info => None,
            Self::Success => Some("\x1b[32m"),
            Self::Warning => Some("\x1b[33m"),
            Self::Error => Some("\x1b[31m"),
            Self::Debug => Some("\x1b[36m"),
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }
}

/// Output formatter with configurable verbosity.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    quiet: bool,
    verbose: bool,
    colored: bool,
}

impl OutputFormatter {
    /// Create a formatter. Colour is used when stdout is a terminal.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            colored: io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    /// Create a formatter from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.quiet && !config.dry_run, config.verbose)
    }

    /// Create a quiet formatter (only warnings and errors).
    pub fn quiet() -> Self {
        Self::new(true, false)
    }

    /// Create a verbose formatter.
    pub fn verbose() -> Self {
        Self::new(false, true)
    }

    /// Disable or enable ANSI colours.
    pub fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Format a message the way it would be printed.
    pub fn format(&self, level: MessageLevel, message: &str) -> String {
        let prefix = level.prefix();
        match level.color() {
            Some(color) if self.colored => format!("{color}{prefix}{message}\x1b[0m"),
            _ => format!("{prefix}{message}"),
        }
    }

    fn print(&self, level: MessageLevel, message: &str) {
        let line = self.format(level, message);
        if level.to_stderr() {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    /// Print an informational message. Suppressed in quiet mode.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.print(MessageLevel::Info, message);
        }
    }

    /// Print a success message. Suppressed in quiet mode.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.print(MessageLevel::Success, message);
        }
    }

    /// Print a warning.
    pub fn warning(&self, message: &str) {
        self.print(MessageLevel::Warning, message);
    }

    /// Print an error.
    pub fn error(&self, message: &str) {
        self.print(MessageLevel::Error, message);
    }

    /// Print a debug line. Verbose mode only.
    pub fn debug(&self, message: &str) {
        if self.verbose {
            self.print(MessageLevel::Debug, message);
        }
    }

    /// Print a section header. Suppressed in quiet mode.
    pub fn section(&self, title: &str) {
        if !self.quiet {
            println!("\n{title}");
        }
    }

    /// Print a `label: value` detail. Verbose mode only.
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbose {
            println!("  {label}: {value}");
        }
    }

    /// Print the page list, marking the selected row.
    ///
    /// Printed even in quiet mode: the list is the output the user asked for.
    pub fn page_list<S: AsRef<str>>(&self, labels: &[S], selected: Option<usize>) {
        if labels.is_empty() {
            println!("(no pages)");
            return;
        }
        let width = labels.len().to_string().len();
        for (i, label) in labels.iter().enumerate() {
            let marker = selected == Some(i);
            println!("{}", format_page_row(i + 1, width, label.as_ref(), marker));
        }
    }

    /// Print a blank line. Suppressed in quiet mode.
    pub fn blank_line(&self) {
        if !self.quiet {
            println!();
        }
    }

    /// True unless in quiet mode.
    pub fn should_print(&self) -> bool {
        !self.quiet
    }

    /// True in verbose mode.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// True in quiet mode.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}

fn format_page_row(position: usize, width: usize, label: &str, selected: bool) -> String {
    let marker = if selected { '>' } else { ' ' };
    format!("{marker} {position:>width$}. {label}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_formatter() {
        let formatter = OutputFormatter::new(false, false);
        assert!(!formatter.is_quiet());
        assert!(!formatter.is_verbose());
        assert!(formatter.should_print());
    }

    #[test]
    fn test_quiet_and_verbose() {
        assert!(!OutputFormatter::quiet().should_print());
        assert!(OutputFormatter::verbose().is_verbose());
    }

    #[test]
    fn test_from_config_dry_run_overrides_quiet() {
        let mut config = Config::new(vec!["a.png".into()], "out.pdf".into());
        config.quiet = true;
        assert!(OutputFormatter::from_config(&config).is_quiet());

        config.dry_run = true;
        assert!(!OutputFormatter::from_config(&config).is_quiet());
    }

    #[test]
    fn test_format_plain() {
        let formatter = OutputFormatter::default().with_color(false);
        assert_eq!(formatter.format(MessageLevel::Info, "hello"), "hello");
        assert_eq!(formatter.format(MessageLevel::Error, "bad"), "✗ bad");
    }

    #[test]
    fn test_format_colored() {
        let formatter = OutputFormatter::default().with_color(true);
        assert_eq!(
            formatter.format(MessageLevel::Success, "done"),
            "\x1b[32m✓ done\x1b[0m"
        );
        // Info has no colour.
        assert_eq!(formatter.format(MessageLevel::Info, "plain"), "plain");
    }

    #[test]
    fn test_format_page_row() {
        assert_eq!(format_page_row(3, 2, "doc.pdf-1", false), "   3. doc.pdf-1");
        assert_eq!(format_page_row(12, 2, "a.png", true), "> 12. a.png");
    }
}
