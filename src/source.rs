//! Page sources.
//!
//! A page source is where one page of the output comes from: either a whole
//! raster image, or a single page of an existing PDF.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{BuilderError, Result};

/// File extensions accepted as page sources (lowercase, without the dot).
pub const VALID_EXTENSIONS: &[&str] = &[
    "pdf", "png", "jpg", "jpeg", "gif", "ico", "tiff", "bmp", "pdn", "heic",
];

/// Kind of file a page comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A PDF document, expanded page by page.
    Pdf,
    /// A raster image, one page.
    Image,
}

impl SourceKind {
    /// Classify a path by its extension.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::InvalidExtension`] when the extension is missing
    /// or not in [`VALID_EXTENSIONS`].
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| BuilderError::invalid_extension(path.to_path_buf()))?;

        match ext.as_str() {
            "pdf" => Ok(Self::Pdf),
            other if VALID_EXTENSIONS.contains(&other) => Ok(Self::Image),
            _ => Err(BuilderError::invalid_extension(path.to_path_buf())),
        }
    }
}

/// One page of the document being built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageSource {
    /// A raster image that becomes a full page.
    Image {
        /// Path to the image file.
        path: PathBuf,
    },
    /// One page of a PDF document.
    PdfPage {
        /// Path to the PDF file.
        path: PathBuf,
        /// Zero-based page index.
        index: usize,
    },
}

impl PageSource {
    /// Create an image page source.
    pub fn image(path: impl Into<PathBuf>) -> Self {
        Self::Image { path: path.into() }
    }

    /// Create a PDF page source (`index` is zero-based).
    pub fn pdf_page(path: impl Into<PathBuf>, index: usize) -> Self {
        Self::PdfPage {
            path: path.into(),
            index,
        }
    }

    /// Path of the file this page comes from.
    pub fn path(&self) -> &Path {
        match self {
            Self::Image { path } | Self::PdfPage { path, .. } => path,
        }
    }

    /// Kind of the underlying file.
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Image { .. } => SourceKind::Image,
            Self::PdfPage { .. } => SourceKind::Pdf,
        }
    }

    /// Text shown for this page in the page list.
    ///
    /// Images show their file name; PDF pages show the file name followed by
    /// the 1-based page number, e.g. `report.pdf-3`.
    pub fn label(&self) -> String {
        let name = self
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path().display().to_string());

        match self {
            Self::Image { .. } => name,
            Self::PdfPage { index, .. } => format!("{name}-{}", index + 1),
        }
    }
}

impl fmt::Display for PageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
