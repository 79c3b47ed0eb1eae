//! Preview bitmaps.
//!
//! Every page in the list gets a preview of exactly the layout's size.
//! Images are decoded and resized with a Lanczos filter. PDF pages are
//! handed to a [`Rasterizer`]; the bundled [`PlaceholderRasterizer`] draws
//! the page outline at its real aspect ratio. [`compose_strip`] stacks the
//! previews into one tall image, in list order, with separator lines.

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use lopdf::Document;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::PreviewLayout;
use crate::error::{BuilderError, Result};
use crate::render::{load_image, pages};
use crate::source::PageSource;

const CANVAS_BACKGROUND: Rgba<u8> = Rgba([235, 235, 235, 255]);
const PAGE_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);
const PAGE_BORDER: Rgba<u8> = Rgba([150, 150, 150, 255]);
const STRIP_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const SEPARATOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// A rendered preview.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    image: RgbaImage,
}

impl Preview {
    /// Wrap an already rendered bitmap.
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The underlying bitmap.
    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Write the preview as a PNG file.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| BuilderError::FailedToWrite {
                path: path.to_path_buf(),
                source: std::io::Error::other(e),
            })
    }
}

/// Draws a PDF page into a bitmap.
pub trait Rasterizer: Send + Sync {
    /// Render page `index` (zero-based) of the PDF at `path` to `width` x `height`.
    fn rasterize(&self, path: &Path, index: usize, width: u32, height: u32) -> Result<RgbaImage>;
}

/// Draws a blank sheet with the page's proportions and a thin border.
///
/// Page sizes are read once per file and cached.
#[derive(Debug, Default)]
pub struct PlaceholderRasterizer {
    page_sizes: Mutex<HashMap<PathBuf, Vec<(f32, f32)>>>,
}

impl PlaceholderRasterizer {
    /// Create a rasterizer with an empty size cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn page_size(&self, path: &Path, index: usize) -> Result<(f32, f32)> {
        let mut cache = self
            .page_sizes
            .lock()
            .map_err(|_| BuilderError::other("page size cache poisoned"))?;

        if !cache.contains_key(path) {
            let doc = Document::load(path)
                .map_err(|e| BuilderError::failed_to_load_pdf(path.to_path_buf(), e.to_string()))?;
            let sizes = doc
                .get_pages()
                .values()
                .map(|&id| pages::page_dimensions(&doc, id))
                .collect();
            cache.insert(path.to_path_buf(), sizes);
        }

        let sizes = &cache[path];
        sizes
            .get(index)
            .copied()
            .ok_or_else(|| BuilderError::PageNotFound {
                path: path.to_path_buf(),
                index,
                page_count: sizes.len(),
            })
    }
}

impl Rasterizer for PlaceholderRasterizer {
    fn rasterize(&self, path: &Path, index: usize, width: u32, height: u32) -> Result<RgbaImage> {
        let (page_w, page_h) = self.page_size(path, index)?;
        Ok(draw_page_outline(width, height, page_w, page_h))
    }
}

/// Centre a white sheet of aspect `page_w:page_h` on a grey canvas.
fn draw_page_outline(width: u32, height: u32, page_w: f32, page_h: f32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, CANVAS_BACKGROUND);
    if page_w <= 0.0 || page_h <= 0.0 || width == 0 || height == 0 {
        return canvas;
    }

    let scale = (width as f32 / page_w).min(height as f32 / page_h);
    let sheet_w = ((page_w * scale).round() as u32).clamp(1, width);
    let sheet_h = ((page_h * scale).round() as u32).clamp(1, height);
    let x0 = (width - sheet_w) / 2;
    let y0 = (height - sheet_h) / 2;

    for y in y0..y0 + sheet_h {
        for x in x0..x0 + sheet_w {
            let on_edge = x == x0 || y == y0 || x == x0 + sheet_w - 1 || y == y0 + sheet_h - 1;
            canvas.put_pixel(x, y, if on_edge { PAGE_BORDER } else { PAGE_FILL });
        }
    }

    canvas
}

/// Renders previews at a fixed size.
pub struct Previewer {
    layout: PreviewLayout,
    rasterizer: Box<dyn Rasterizer>,
}

impl Previewer {
    /// Create a previewer using the placeholder rasterizer for PDF pages.
    pub fn new(layout: PreviewLayout) -> Self {
        Self::with_rasterizer(layout, Box::new(PlaceholderRasterizer::new()))
    }

    /// Create a previewer with a custom PDF rasterizer.
    pub fn with_rasterizer(layout: PreviewLayout, rasterizer: Box<dyn Rasterizer>) -> Self {
        Self { layout, rasterizer }
    }

    /// Preview geometry.
    pub fn layout(&self) -> &PreviewLayout {
        &self.layout
    }

    /// Render one page source.
    ///
    /// Images are stretched to the preview size, they do not keep their
    /// aspect ratio.
    pub fn render(&self, source: &PageSource) -> Result<Preview> {
        let PreviewLayout { width, height, .. } = self.layout;

        let image = match source {
            PageSource::Image { path } => {
                load_image(path)?
                    .resize_exact(width, height, FilterType::Lanczos3)
                    .to_rgba8()
            }
            PageSource::PdfPage { path, index } => {
                self.rasterizer.rasterize(path, *index, width, height)?
            }
        };

        Ok(Preview::new(image))
    }
}

/// Stack previews top to bottom, slot `i` starting at
/// [`PreviewLayout::offset_of`], with a one pixel line at
/// [`PreviewLayout::separator_y`] between neighbours.
///
/// A missing preview leaves its slot blank so later slots keep their place.
pub fn compose_strip(layout: &PreviewLayout, previews: &[Option<&Preview>]) -> Result<Preview> {
    let height = u32::try_from(layout.total_height(previews.len())).map_err(|_| {
        BuilderError::other(format!(
            "Preview strip for {} pages is too tall",
            previews.len()
        ))
    })?;
    let mut strip = RgbaImage::from_pixel(layout.width, height, STRIP_BACKGROUND);

    for (i, preview) in previews.iter().enumerate() {
        if let Some(preview) = preview {
            imageops::replace(&mut strip, preview.as_image(), 0, layout.offset_of(i) as i64);
        }
        if let Some(y) = layout.separator_y(i) {
            let y = y.floor() as u32;
            for x in 0..layout.width {
                strip.put_pixel(x, y, SEPARATOR);
            }
        }
    }

    Ok(Preview::new(strip))
}

impl Default for Previewer {
    fn default() -> Self {
        Self::new(PreviewLayout::default())
    }
}

impl std::fmt::Debug for Previewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Previewer")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}
