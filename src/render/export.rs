//! Building the output document.
//!
//! PDF pages are copied as PDF objects, so text, vector graphics and fonts
//! survive untouched. Images are embedded as Flate-compressed image
//! XObjects, one per page.
//!
//! The algorithm:
//! 1. Load every distinct source PDF once
//! 2. Renumber each PDF's objects past the current maximum id and move them in
//! 3. Walk the page list, picking copied pages or creating image pages
//! 4. Build a fresh page tree and catalog, then prune what is unreachable
//!
//! # Examples
//!
//! ```no_run
//! use pdfbuilder::render::{ExportOptions, Exporter};
//! use pdfbuilder::source::PageSource;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let exporter = Exporter::new(ExportOptions::default());
//! let sources = vec![
//!     PageSource::image("cover.jpg"),
//!     PageSource::pdf_page("report.pdf", 0),
//! ];
//! let (document, stats) = exporter.build(&sources).await?;
//! println!("{} pages", stats.total_pages);
//! # Ok(())
//! # }
//! ```

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::{DynamicImage, GenericImageView};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::config::{CompressionLevel, Config, DEFAULT_IMAGE_DPI, Metadata, POINTS_PER_INCH, PageSize};
use crate::error::{BuilderError, Result};
use crate::io::{LoadedPdf, PdfReader, PdfWriter, WriteStatistics};
use crate::render::{load_image, metadata, pages};
use crate::source::PageSource;
use crate::utils::format_file_size;

/// Name of the image XObject inside each image page's resources.
const IMAGE_RESOURCE: &str = "Im0";

/// Settings that shape the exported document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Page size for image pages.
    pub page_size: PageSize,
    /// Resolution for [`PageSize::Image`].
    pub image_dpi: u32,
    /// Stream compression.
    pub compression: CompressionLevel,
    /// Info dictionary fields.
    pub metadata: Metadata,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            image_dpi: DEFAULT_IMAGE_DPI,
            compression: CompressionLevel::default(),
            metadata: Metadata::default(),
        }
    }
}

impl From<&Config> for ExportOptions {
    fn from(config: &Config) -> Self {
        Self {
            page_size: config.page_size,
            image_dpi: config.image_dpi,
            compression: config.compression,
            metadata: config.metadata.clone(),
        }
    }
}

/// Statistics about an export.
#[derive(Debug, Clone)]
pub struct ExportStatistics {
    /// Pages in the output.
    pub total_pages: usize,
    /// Pages copied from PDFs.
    pub pdf_pages: usize,
    /// Pages created from images.
    pub image_pages: usize,
    /// Distinct PDF files read.
    pub source_pdfs: usize,
    /// Combined size of the distinct PDF files read.
    pub input_size: u64,
    /// Time spent loading PDFs.
    pub load_time: Duration,
    /// Total time spent building the document.
    pub build_time: Duration,
}

impl ExportStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }
}

/// Where an image lands on its page, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    page_width: f32,
    page_height: f32,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Placement {
    fn compute(pixel_width: u32, pixel_height: u32, page_size: PageSize, dpi: u32) -> Self {
        let px_w = pixel_width.max(1) as f32;
        let px_h = pixel_height.max(1) as f32;

        let Some((page_width, page_height)) = page_size.fixed_dimensions() else {
            let scale = POINTS_PER_INCH / dpi.max(1) as f32;
            let (width, height) = (px_w * scale, px_h * scale);
            return Self {
                page_width: width,
                page_height: height,
                x: 0.0,
                y: 0.0,
                width,
                height,
            };
        };

        if !page_size.keeps_aspect_ratio() {
            return Self {
                page_width,
                page_height,
                x: 0.0,
                y: 0.0,
                width: page_width,
                height: page_height,
            };
        }

        let scale = (page_width / px_w).min(page_height / px_h);
        let (width, height) = (px_w * scale, px_h * scale);
        Self {
            page_width,
            page_height,
            x: (page_width - width) / 2.0,
            y: (page_height - height) / 2.0,
            width,
            height,
        }
    }

    fn content_stream(&self) -> Vec<u8> {
        format!(
            "q\n{:.3} 0 0 {:.3} {:.3} {:.3} cm\n/{IMAGE_RESOURCE} Do\nQ\n",
            self.width, self.height, self.x, self.y
        )
        .into_bytes()
    }
}

/// Builds output documents from page sources.
#[derive(Debug, Clone)]
pub struct Exporter {
    reader: PdfReader,
    options: ExportOptions,
}

impl Exporter {
    /// Create an exporter.
    pub fn new(options: ExportOptions) -> Self {
        Self {
            reader: PdfReader::new(),
            options,
        }
    }

    /// Options in use.
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Build the output document for `sources`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::NothingToExport`] for an empty list, and load,
    /// decode or assembly errors otherwise.
    pub async fn build(&self, sources: &[PageSource]) -> Result<(Document, ExportStatistics)> {
        if sources.is_empty() {
            return Err(BuilderError::NothingToExport);
        }

        let start = Instant::now();

        let mut pdf_paths: Vec<PathBuf> = Vec::new();
        for source in sources {
            if let PageSource::PdfPage { path, .. } = source
                && !pdf_paths.contains(path)
            {
                pdf_paths.push(path.clone());
            }
        }

        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let (results, load_stats) = self.reader.load_all(&pdf_paths, workers).await;
        let loaded = results.into_iter().collect::<Result<Vec<LoadedPdf>>>()?;

        let (pdf_pages, image_pages) = count_kinds(sources);
        let sources = sources.to_vec();
        let options = self.options.clone();
        let document = task::spawn_blocking(move || assemble(&sources, loaded, &options))
            .await
            .map_err(|e| BuilderError::other(format!("Export task failed: {e}")))??;

        let statistics = ExportStatistics {
            total_pages: pdf_pages + image_pages,
            pdf_pages,
            image_pages,
            source_pdfs: load_stats.success_count,
            input_size: load_stats.total_size,
            load_time: load_stats.total_time,
            build_time: start.elapsed(),
        };

        Ok((document, statistics))
    }

    /// Build the document and write it to `output`.
    pub async fn export_to(
        &self,
        sources: &[PageSource],
        output: &Path,
        writer: &PdfWriter,
    ) -> Result<(ExportStatistics, WriteStatistics)> {
        let (document, export_stats) = self.build(sources).await?;
        let write_stats = writer.save_with_stats(document, output).await?;
        Ok((export_stats, write_stats))
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(ExportOptions::default())
    }
}

fn count_kinds(sources: &[PageSource]) -> (usize, usize) {
    let pdf = sources
        .iter()
        .filter(|s| matches!(s, PageSource::PdfPage { .. }))
        .count();
    (pdf, sources.len() - pdf)
}

fn assemble(
    sources: &[PageSource],
    loaded: Vec<LoadedPdf>,
    options: &ExportOptions,
) -> Result<Document> {
    let mut doc = Document::with_version("1.5");
    let mut page_maps: HashMap<PathBuf, Vec<ObjectId>> = HashMap::new();

    for pdf in loaded {
        let LoadedPdf {
            document: mut source_doc,
            path,
            ..
        } = pdf;

        source_doc.renumber_objects_with(doc.max_id + 1);
        let page_ids: Vec<ObjectId> = source_doc.get_pages().into_values().collect();
        for &page_id in &page_ids {
            pages::flatten_inherited_attributes(&mut source_doc, page_id)?;
        }

        doc.max_id = doc.max_id.max(source_doc.max_id);
        doc.objects.extend(source_doc.objects);
        log::debug!("copied {} page(s) from {}", page_ids.len(), path.display());
        page_maps.insert(path, page_ids);
    }

    let mut used = HashSet::new();
    let mut kids = Vec::with_capacity(sources.len());

    for source in sources {
        let page_id = match source {
            PageSource::PdfPage { path, index } => {
                let ids = page_maps.get(path).ok_or_else(|| {
                    BuilderError::export_failed(format!("{} was not loaded", path.display()))
                })?;
                let &page_id = ids.get(*index).ok_or_else(|| BuilderError::PageNotFound {
                    path: path.clone(),
                    index: *index,
                    page_count: ids.len(),
                })?;

                if used.insert(page_id) {
                    page_id
                } else {
                    // The same page may not appear twice in a page tree.
                    let copy = doc.get_dictionary(page_id)?.clone();
                    doc.add_object(copy)
                }
            }
            PageSource::Image { path } => add_image_page(&mut doc, path, options)?,
        };
        kids.push(page_id);
    }

    let pages_id = pages::build_page_tree(&mut doc, &kids)?;
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let pruned = doc.prune_objects();
    log::debug!("pruned {} unreachable object(s)", pruned.len());

    if options.compression != CompressionLevel::None {
        doc.compress();
    }

    metadata::write_info(&mut doc, &options.metadata);
    doc.renumber_objects();

    Ok(doc)
}

/// Append a page showing the image at `path` and return its id.
fn add_image_page(doc: &mut Document, path: &Path, options: &ExportOptions) -> Result<ObjectId> {
    let image = load_image(path)?;
    let (pixel_width, pixel_height) = image.dimensions();

    let (samples, color_space) = image_samples(image);
    let level = match options.compression {
        CompressionLevel::None => Compression::fast(),
        CompressionLevel::Standard => Compression::default(),
        CompressionLevel::Maximum => Compression::best(),
    };
    let data = deflate(&samples, level).map_err(|e| {
        BuilderError::export_failed(format!("Failed to encode {}: {e}", path.display()))
    })?;

    let image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(pixel_width),
        "Height" => i64::from(pixel_height),
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };
    let image_id = doc.add_object(Stream::new(image_dict, data).with_compression(false));

    let placement = Placement::compute(
        pixel_width,
        pixel_height,
        options.page_size,
        options.image_dpi,
    );
    let content_id = doc.add_object(Stream::new(Dictionary::new(), placement.content_stream()));

    let page = dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![
            0.into(),
            0.into(),
            placement.page_width.into(),
            placement.page_height.into(),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_RESOURCE => image_id,
            },
        },
    };

    Ok(doc.add_object(page))
}

/// Raw 8-bit samples and the matching colour space name.
///
/// Transparent pixels are composited over white, as a PDF viewer would show
/// them on paper.
fn image_samples(image: DynamicImage) -> (Vec<u8>, &'static str) {
    let color = image.color();
    let grey = color.channel_count() <= 2;

    match (grey, color.has_alpha()) {
        (true, false) => (image.into_luma8().into_raw(), "DeviceGray"),
        (true, true) => {
            let samples = image
                .into_luma_alpha8()
                .pixels()
                .map(|p| over_white(p[0], p[1]))
                .collect();
            (samples, "DeviceGray")
        }
        (false, false) => (image.into_rgb8().into_raw(), "DeviceRGB"),
        (false, true) => {
            let samples = image
                .into_rgba8()
                .pixels()
                .flat_map(|p| {
                    let a = p[3];
                    [over_white(p[0], a), over_white(p[1], a), over_white(p[2], a)]
                })
                .collect();
            (samples, "DeviceRGB")
        }
    }
}

fn over_white(value: u8, alpha: u8) -> u8 {
    let (v, a) = (u32::from(value), u32::from(alpha));
    ((v * a + 255 * (255 - a) + 127) / 255) as u8
}

fn deflate(data: &[u8], level: Compression) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), level);
    encoder.write_all(data)?;
    encoder.finish()
}
