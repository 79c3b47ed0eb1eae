//! pdfbuilder - Assemble one PDF from PDF pages and images.
//!
//! The library keeps an ordered list of page sources, each either an image
//! file or a single page of a PDF, and turns it into one document. It
//! supports:
//!
//! - Adding files, directories and glob patterns
//! - Reordering: top, bottom, up, down and arbitrary moves
//! - Fixed-size preview bitmaps for every page
//! - Lossless export of PDF pages next to embedded images
//! - A text command session for scripted edits
//!
//! # Examples
//!
//! ## Building a document
//!
//! ```no_run
//! use pdfbuilder::collection::PageCollection;
//! use pdfbuilder::io::PdfWriter;
//! use pdfbuilder::render::Exporter;
//! use std::path::{Path, PathBuf};
//!
//! # async fn example() -> pdfbuilder::Result<()> {
//! let mut pages = PageCollection::new();
//! let report = pages
//!     .add_paths(&[PathBuf::from("cover.png"), PathBuf::from("report.pdf")])
//!     .await?;
//! println!("{} page(s), {} file(s) skipped", report.added, report.rejected.len());
//!
//! pages.move_to_bottom(0)?;
//!
//! let exporter = Exporter::default();
//! exporter
//!     .export_to(&pages.sources(), Path::new("out.pdf"), &PdfWriter::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Scripted session
//!
//! ```no_run
//! use pdfbuilder::session::Session;
//!
//! # async fn example() -> pdfbuilder::Result<()> {
//! let mut session = Session::default();
//! for line in ["add scans/", "top 4", "save album.pdf"] {
//!     session.execute_line(line).await?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod config;
pub mod error;
pub mod io;
pub mod output;
pub mod render;
pub mod session;
pub mod source;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{BuilderError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
