//! Error types for pdfbuilder.
//!
//! Every failure a user can run into while adding, arranging, previewing or
//! exporting pages is a variant of [`BuilderError`]. Messages carry enough
//! context (paths, positions) to be printed as-is by the CLI.
//!
//! # Error Categories
//!
//! - **Input Errors**: missing files, rejected extensions, unreadable PDFs/images
//! - **Collection Errors**: positions outside the page list
//! - **Export Errors**: empty collection, document assembly, writing
//! - **Session Errors**: commands that cannot be parsed

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfbuilder operations.
pub type Result<T> = std::result::Result<T, BuilderError>;

/// Main error type for pdfbuilder operations.
#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    /// Input file was not found.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input file is not accessible (permission denied, etc.).
    #[error("Cannot access file: {}\n  Reason: {source}", .path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Path exists but is not a regular file.
    #[error("Not a file: {}", .path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// File extension is not one of the accepted page formats.
    #[error(
        "Unsupported file type: {}\n  \
         Accepted extensions: pdf, png, jpg, jpeg, gif, ico, tiff, bmp, pdn, heic",
        .path.display()
    )]
    InvalidExtension {
        /// Path of the rejected file.
        path: PathBuf,
    },

    /// Failed to load PDF file.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", .path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// PDF file is encrypted and cannot be processed.
    #[error(
        "PDF is encrypted and cannot be processed: {}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools",
        .path.display()
    )]
    EncryptedPdf {
        /// Path to the encrypted PDF.
        path: PathBuf,
    },

    /// PDF does not contain the requested page.
    #[error("Page {} does not exist in {} ({page_count} page(s))", .index + 1, .path.display())]
    PageNotFound {
        /// Path to the PDF.
        path: PathBuf,
        /// Zero-based page index that was requested.
        index: usize,
        /// Number of pages in the PDF.
        page_count: usize,
    },

    /// Image could not be decoded.
    #[error("Failed to decode image: {}\n  Reason: {reason}", .path.display())]
    ImageDecode {
        /// Path to the image.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// A position outside the page list was used.
    #[error("Position {} is out of range (the list has {len} page(s))", .index + 1)]
    IndexOutOfBounds {
        /// Zero-based index that was requested.
        index: usize,
        /// Number of entries in the collection.
        len: usize,
    },

    /// Export was requested on an empty collection.
    #[error("No pages to save")]
    NothingToExport,

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Use --force to overwrite or choose a different output path",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", .path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to read input list file.
    #[error("Failed to read input list file: {}\n  Reason: {source}", .path.display())]
    FailedToReadInputList {
        /// Path to the input list file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Input list file contains invalid paths.
    #[error(
        "Invalid entry in input list file: {} at line {line_number}\n  Details: {details}",
        .path.display()
    )]
    InvalidInputList {
        /// Path to the input list file.
        path: PathBuf,
        /// Line number with the error.
        line_number: usize,
        /// Details about what's invalid.
        details: String,
    },

    /// Building the output document failed.
    #[error("Export failed: {reason}")]
    ExportFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Session command could not be parsed.
    #[error("Invalid command '{input}': {reason}")]
    InvalidCommand {
        /// The raw command line.
        input: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for BuilderError {
    fn from(err: lopdf::Error) -> Self {
        Self::export_failed(err.to_string())
    }
}

impl From<anyhow::Error> for BuilderError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl BuilderError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create an InvalidExtension error.
    pub fn invalid_extension(path: PathBuf) -> Self {
        Self::InvalidExtension { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create an EncryptedPdf error.
    pub fn encrypted_pdf(path: PathBuf) -> Self {
        Self::EncryptedPdf { path }
    }

    /// Create an ImageDecode error.
    pub fn image_decode(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::ImageDecode {
            path,
            reason: reason.into(),
        }
    }

    /// Create an IndexOutOfBounds error.
    pub fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an ExportFailed error.
    pub fn export_failed(reason: impl Into<String>) -> Self {
        Self::ExportFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidCommand error.
    pub fn invalid_command(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCommand {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error only concerns a single input file.
    ///
    /// Recoverable errors are reported while adding a batch of files, and the
    /// remaining files are still added.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::FileNotAccessible { .. }
                | Self::NotAFile { .. }
                | Self::InvalidExtension { .. }
                | Self::FailedToLoadPdf { .. }
                | Self::EncryptedPdf { .. }
                | Self::ImageDecode { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::InvalidExtension { .. } => 1,
            Self::FailedToLoadPdf { .. } => 3,
            Self::EncryptedPdf { .. } => 3,
            Self::PageNotFound { .. } => 3,
            Self::ImageDecode { .. } => 3,
            Self::IndexOutOfBounds { .. } => 1,
            Self::NothingToExport => 1,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::FailedToReadInputList { .. } => 2,
            Self::InvalidInputList { .. } => 1,
            Self::ExportFailed { .. } => 6,
            Self::InvalidCommand { .. } => 1,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
