//! File input and output.
//!
//! - [`reader`]: turning files into page sources, loading PDFs
//! - [`writer`]: atomic PDF output

pub mod reader;
pub mod writer;

pub use reader::{LoadResult, LoadStatistics, LoadedPdf, PdfReader};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
