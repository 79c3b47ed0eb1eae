//! Writing the finished PDF.
//!
//! Documents are serialized on the blocking pool and written atomically:
//! the bytes go to a sibling temporary file which is then renamed over the
//! destination, so a failed export never leaves a half-written PDF behind.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbuilder::io::writer::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! let stats = writer.save_with_stats(doc, Path::new("out.pdf")).await?;
//! println!("wrote {}", stats.format_file_size());
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::config::OverwriteMode;
use crate::error::{BuilderError, Result};
use crate::utils::format_file_size;

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            buffer_size: 64 * 1024,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer without atomic writes.
    pub fn non_atomic() -> Self {
        Self::with_options(WriteOptions {
            atomic: false,
            ..Default::default()
        })
    }

    /// Check whether the output may be written under `mode`.
    ///
    /// `Prompt` is treated like `NoClobber` here; callers that can ask the
    /// user should do so before calling this with `Force`.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::OutputExists`] if the file exists and may not
    /// be replaced, or an error if the parent directory is missing.
    pub async fn check_output(&self, path: &Path, mode: OverwriteMode) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
            && !tokio::fs::try_exists(parent).await.unwrap_or(false)
        {
            return Err(BuilderError::invalid_config(format!(
                "Output directory does not exist: {}",
                parent.display()
            )));
        }

        let exists = tokio::fs::try_exists(path).await.unwrap_or(false);
        match mode {
            OverwriteMode::Force => Ok(()),
            OverwriteMode::Prompt | OverwriteMode::NoClobber if exists => {
                Err(BuilderError::output_exists(path.to_path_buf()))
            }
            _ => Ok(()),
        }
    }

    /// Save a PDF and return statistics about the operation.
    ///
    /// Takes the document by value: it is moved to the blocking pool for
    /// serialization.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, written or renamed.
    pub async fn save_with_stats(&self, mut doc: Document, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();

        task::spawn_blocking(move || {
            let start = Instant::now();

            let write_path = if options.atomic {
                temp_path_for(&path_buf)
            } else {
                path_buf.clone()
            };

            let file = std::fs::File::create(&write_path).map_err(|e| {
                BuilderError::FailedToCreateOutput {
                    path: write_path.clone(),
                    source: e,
                }
            })?;

            let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);

            let written = doc
                .save_to(&mut writer)
                .map_err(|e| BuilderError::FailedToWrite {
                    path: write_path.clone(),
                    source: std::io::Error::other(e),
                })
                .and_then(|_| {
                    writer.flush().map_err(|e| BuilderError::FailedToWrite {
                        path: write_path.clone(),
                        source: e,
                    })
                });

            if let Err(err) = written {
                if options.atomic {
                    let _ = std::fs::remove_file(&write_path);
                }
                return Err(err);
            }
            drop(writer);

            if options.atomic {
                std::fs::rename(&write_path, &path_buf).map_err(|e| {
                    let _ = std::fs::remove_file(&write_path);
                    BuilderError::FailedToWrite {
                        path: path_buf.clone(),
                        source: e,
                    }
                })?;
            }

            let file_size = std::fs::metadata(&path_buf).map(|m| m.len()).unwrap_or(0);
            log::debug!("wrote {} bytes to {}", file_size, path_buf.display());

            Ok(WriteStatistics {
                write_time: start.elapsed(),
                file_size,
                output_path: path_buf,
            })
        })
        .await
        .map_err(|e| BuilderError::other(format!("Write task failed: {e}")))?
    }

    /// Save a PDF document to a file.
    pub async fn save(&self, doc: Document, path: &Path) -> Result<()> {
        self.save_with_stats(doc, path).await.map(|_| ())
    }
}

/// Sibling temporary path used for atomic writes.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.pdf".to_string());
    path.with_file_name(format!(".{name}.partial"))
}
