//! Turning page sources into pixels and PDF objects.
//!
//! - [`preview`]: fixed-size preview bitmaps for the page list
//! - [`export`]: assembling the output document
//! - [`pages`]: page tree helpers shared by both
//! - [`metadata`]: the output Info dictionary

pub mod export;
pub mod metadata;
pub mod pages;
pub mod preview;

pub use export::{ExportOptions, ExportStatistics, Exporter};
pub use preview::{PlaceholderRasterizer, Preview, Previewer, Rasterizer, compose_strip};

use crate::error::{BuilderError, Result};
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// Decode a raster image, mapping every failure to [`BuilderError::ImageDecode`].
///
/// The format is sniffed from the file content; the extension is only a
/// fallback, so a PNG saved as `.jpg` still decodes.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(BuilderError::file_not_found(path.to_path_buf()));
    }

    let decode_error = |reason: String| BuilderError::image_decode(path.to_path_buf(), reason);

    ImageReader::open(path)
        .and_then(ImageReader::with_guessed_format)
        .map_err(|e| decode_error(e.to_string()))?
        .decode()
        .map_err(|e| decode_error(e.to_string()))
}
