//! User-facing output for pdfbuilder.
//!
//! This module handles:
//! - Formatted status messages with quiet and verbose modes
//! - The progress bar shown while files are added
//! - Summaries of adds, exports and session outcomes
//!
//! # Examples
//!
//! ```no_run
//! use pdfbuilder::output::OutputFormatter;
//! use pdfbuilder::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Adding 3 file(s)");
//! formatter.success("Saved album.pdf");
//! # }
//! ```

pub mod formatter;
pub mod progress;

pub use formatter::{MessageLevel, OutputFormatter};
pub use progress::{ProgressBar, ProgressStyle};

use crate::collection::AddReport;
use crate::io::WriteStatistics;
use crate::render::ExportStatistics;
use crate::session::Outcome;

/// Report rejected files and the number of pages added.
pub fn display_add_report(formatter: &OutputFormatter, report: &AddReport) {
    for error in &report.rejected {
        formatter.warning(&format!("Skipped: {error}"));
    }
    formatter.info(&format!("Added {} page(s)", report.added));
}

/// Summarise a finished export.
pub fn display_export_summary(
    formatter: &OutputFormatter,
    export: &ExportStatistics,
    write: &WriteStatistics,
) {
    formatter.success(&format!(
        "Saved {} page(s) to {} ({})",
        export.total_pages,
        write.output_path.display(),
        write.format_file_size()
    ));
    formatter.detail("PDF pages", &export.pdf_pages.to_string());
    formatter.detail("Image pages", &export.image_pages.to_string());
    formatter.detail(
        "Source PDFs",
        &format!("{} ({})", export.source_pdfs, export.format_input_size()),
    );
    formatter.detail(
        "Build time",
        &format!("{:.2}s", export.build_time.as_secs_f64()),
    );
    formatter.detail(
        "Write time",
        &format!("{:.2}s", write.write_time.as_secs_f64()),
    );
}

/// Show what a session command did.
pub fn display_outcome(formatter: &OutputFormatter, outcome: &Outcome, selected: Option<usize>) {
    match outcome {
        Outcome::Listed(labels) => formatter.page_list(labels, selected),
        Outcome::Added(report) => display_add_report(formatter, report),
        Outcome::Moved { to, scroll } => {
            formatter.info(&format!("Moved to position {}", to + 1));
            formatter.debug(&format!("Preview strip at {}", format_scroll(*scroll)));
        }
        Outcome::Removed(label) => formatter.info(&format!("Removed {label}")),
        Outcome::Selected { index, scroll } => formatter.info(&format!(
            "Selected page {} (preview strip at {})",
            index + 1,
            format_scroll(*scroll)
        )),
        Outcome::Reset => formatter.info("Page list cleared"),
        Outcome::PreviewsWritten { written, failed } => {
            for (index, error) in failed {
                formatter.warning(&format!("No preview for page {}: {error}", index + 1));
            }
            formatter.success(&format!("Wrote {written} preview(s)"));
        }
        Outcome::StripWritten {
            path,
            pages,
            failed,
        } => {
            for (index, error) in failed {
                formatter.warning(&format!("Blank slot for page {}: {error}", index + 1));
            }
            formatter.success(&format!(
                "Wrote preview strip of {pages} page(s) to {}",
                path.display()
            ));
        }
        Outcome::Saved { export, write } => display_export_summary(formatter, export, write),
        Outcome::Help(text) => println!("{text}"),
        Outcome::Quit => {}
    }
}

/// Scroll position as a percentage of the preview strip.
fn format_scroll(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}
