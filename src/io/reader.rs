//! Reading page sources from disk.
//!
//! This module turns user-supplied files into [`PageSource`]s:
//! - PDFs are loaded and expanded into one source per page
//! - Images are checked and become a single source
//! - Input list files are read line by line
//!
//! PDF parsing is CPU-bound, so it runs on the blocking pool.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbuilder::io::reader::PdfReader;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let sources = reader.sources_for(Path::new("report.pdf")).await?;
//! println!("report.pdf has {} pages", sources.len());
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{BuilderError, Result};
use crate::source::{PageSource, SourceKind};

/// A loaded PDF document with metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to load the document.
    pub load_time: Duration,

    /// File size in bytes.
    pub file_size: u64,
}

impl LoadedPdf {
    fn new(document: Document, path: PathBuf, load_time: Duration) -> Self {
        let page_count = document.get_pages().len();
        let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

        Self {
            document,
            path,
            page_count,
            load_time,
            file_size,
        }
    }
}

/// Result of a load operation (success or failure).
pub type LoadResult = Result<LoadedPdf>;

/// Statistics for a batch load operation.
#[derive(Debug, Clone)]
pub struct LoadStatistics {
    /// Number of PDFs successfully loaded.
    pub success_count: usize,

    /// Number of PDFs that failed to load.
    pub failure_count: usize,

    /// Total time taken for all loads.
    pub total_time: Duration,

    /// Total size of successfully loaded files.
    pub total_size: u64,

    /// Total number of pages loaded.
    pub total_pages: usize,
}

impl LoadStatistics {
    fn from_results(results: &[LoadResult], total_time: Duration) -> Self {
        let mut stats = Self {
            success_count: 0,
            failure_count: 0,
            total_time,
            total_size: 0,
            total_pages: 0,
        };

        for result in results {
            match result {
                Ok(loaded) => {
                    stats.success_count += 1;
                    stats.total_size += loaded.file_size;
                    stats.total_pages += loaded.page_count;
                }
                Err(_) => stats.failure_count += 1,
            }
        }

        stats
    }
}

/// Loader for PDF documents and page sources.
#[derive(Debug, Clone)]
pub struct PdfReader {
    /// Reject PDFs without pages.
    verify: bool,
}

impl PdfReader {
    /// Create a new reader with default settings.
    pub fn new() -> Self {
        Self { verify: true }
    }

    /// Create a reader that accepts PDFs without pages.
    pub fn without_verification() -> Self {
        Self { verify: false }
    }

    /// Check that `path` names an existing regular file.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::FileNotFound`] or [`BuilderError::NotAFile`].
    pub async fn check_file(&self, path: &Path) -> Result<()> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BuilderError::file_not_found(path.to_path_buf())
            } else {
                BuilderError::FileNotAccessible {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        if !metadata.is_file() {
            return Err(BuilderError::not_a_file(path.to_path_buf()));
        }

        Ok(())
    }

    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File does not exist or is not a file
    /// - File is not a valid PDF
    /// - PDF is encrypted
    /// - PDF has no pages (when verifying)
    pub async fn load(&self, path: &Path) -> Result<LoadedPdf> {
        self.check_file(path).await?;

        let path_buf = path.to_path_buf();
        let verify = self.verify;

        task::spawn_blocking(move || {
            let start = Instant::now();

            let doc = Document::load(&path_buf).map_err(|e| {
                let err_msg = e.to_string();
                let lowered = err_msg.to_lowercase();
                if lowered.contains("encrypt")
                    || lowered.contains("decrypt")
                    || lowered.contains("password")
                {
                    BuilderError::encrypted_pdf(path_buf.clone())
                } else {
                    BuilderError::failed_to_load_pdf(path_buf.clone(), err_msg)
                }
            })?;

            if verify && doc.get_pages().is_empty() {
                return Err(BuilderError::failed_to_load_pdf(
                    path_buf.clone(),
                    "PDF has no pages",
                ));
            }

            let loaded = LoadedPdf::new(doc, path_buf, start.elapsed());
            log::debug!(
                "loaded {} ({} pages) in {:?}",
                loaded.path.display(),
                loaded.page_count,
                loaded.load_time
            );
            Ok(loaded)
        })
        .await
        .map_err(|e| BuilderError::other(format!("Load task failed: {e}")))?
    }

    /// Load several PDFs with bounded concurrency.
    ///
    /// Results come back in the same order as `paths`.
    pub async fn load_all(
        &self,
        paths: &[PathBuf],
        workers: usize,
    ) -> (Vec<LoadResult>, LoadStatistics) {
        use futures::stream::{self, StreamExt};

        let start = Instant::now();
        let workers = workers.max(1);

        let tasks = paths.iter().map(|path| {
            let path = path.clone();
            let reader = self.clone();
            async move { reader.load(&path).await }
        });

        let results: Vec<LoadResult> = stream::iter(tasks).buffered(workers).collect().await;
        let stats = LoadStatistics::from_results(&results, start.elapsed());

        (results, stats)
    }

    /// Turn one input file into its page sources.
    ///
    /// PDFs yield one [`PageSource::PdfPage`] per page in page order; images
    /// yield a single [`PageSource::Image`]. Images are only checked for
    /// existence here; decoding happens when previewing or exporting.
    ///
    /// # Errors
    ///
    /// Returns an error for rejected extensions, missing files and unreadable
    /// PDFs.
    pub async fn sources_for(&self, path: &Path) -> Result<Vec<PageSource>> {
        match SourceKind::from_path(path)? {
            SourceKind::Pdf => {
                let loaded = self.load(path).await?;
                Ok((0..loaded.page_count)
                    .map(|index| PageSource::pdf_page(path, index))
                    .collect())
            }
            SourceKind::Image => {
                self.check_file(path).await?;
                Ok(vec![PageSource::image(path)])
            }
        }
    }

    /// Read input paths from a list file.
    ///
    /// One path per line. Lines starting with '#' are comments and empty
    /// lines are skipped. Use "-" to read from stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn read_input_list(&self, path: &Path) -> Result<Vec<PathBuf>> {
        use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

        let source: Box<dyn AsyncRead + Unpin + Send> = if path.as_os_str() == "-" {
            Box::new(tokio::io::stdin())
        } else {
            Box::new(tokio::fs::File::open(path).await.map_err(|e| {
                BuilderError::FailedToReadInputList {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?)
        };

        let mut lines = BufReader::new(source).lines();
        let mut paths = Vec::new();
        let mut line_number = 0;

        while let Some(line) =
            lines
                .next_line()
                .await
                .map_err(|e| BuilderError::FailedToReadInputList {
                    path: path.to_path_buf(),
                    source: e,
                })?
        {
            line_number += 1;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.contains('\0') {
                return Err(BuilderError::InvalidInputList {
                    path: path.to_path_buf(),
                    line_number,
                    details: "Path contains a NUL byte".to_string(),
                });
            }

            paths.push(PathBuf::from(line));
        }

        Ok(paths)
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}
