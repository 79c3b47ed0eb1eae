//! Configuration module for pdfbuilder.
//!
//! This module transforms CLI arguments into a validated, normalized configuration
//! that drives page collection, preview and export. It handles:
//! - Validation of argument combinations
//! - Page sizing of image pages
//! - Preview canvas geometry
//! - Output metadata and overwrite behavior

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::BuilderError;
use crate::session::Command;
use std::{path::PathBuf, str::FromStr};

/// Points per inch in PDF user space.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Default resolution used to size image pages.
pub const DEFAULT_IMAGE_DPI: u32 = 96;

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// No compression of content streams.
    None,
    /// Compress content streams.
    #[default]
    Standard,
    /// Compress content streams and image data at the highest level.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = crate::BuilderError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(BuilderError::InvalidConfig {
                message: format!(
                    "Invalid compression level: {s}. Must be one of: none, standard, maximum"
                ),
            }),
        }
    }
}

/// Page size used for pages made from images.
///
/// PDF pages keep their own MediaBox regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// Page matches the image's pixel size at the configured DPI.
    #[default]
    Image,
    /// ISO A4 portrait, image fitted and centred.
    A4,
    /// US Letter portrait, image fitted and centred.
    Letter,
    /// The preview canvas size, image stretched to fill it.
    Preview,
}

impl PageSize {
    /// Fixed page dimensions in points, or `None` when the page follows the image.
    pub fn fixed_dimensions(&self) -> Option<(f32, f32)> {
        match self {
            Self::Image => None,
            Self::A4 => Some((595.28, 841.89)),
            Self::Letter => Some((612.0, 792.0)),
            Self::Preview => {
                let layout = PreviewLayout::default();
                Some((layout.width as f32, layout.height as f32))
            }
        }
    }

    /// Whether the image keeps its aspect ratio on the page.
    pub fn keeps_aspect_ratio(&self) -> bool {
        !matches!(self, Self::Preview)
    }
}

impl FromStr for PageSize {
    type Err = crate::BuilderError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "a4" => Ok(Self::A4),
            "letter" => Ok(Self::Letter),
            "preview" => Ok(Self::Preview),
            _ => Err(BuilderError::InvalidConfig {
                message: format!(
                    "Invalid page size: {s}. Must be one of: image, a4, letter, preview"
                ),
            }),
        }
    }
}

/// Geometry of the vertical preview strip.
///
/// Previews are stacked top to bottom, each `width` x `height` pixels,
/// separated by `divider` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewLayout {
    /// Preview width in pixels.
    pub width: u32,
    /// Preview height in pixels.
    pub height: u32,
    /// Vertical gap between two previews.
    pub divider: u32,
}

impl Default for PreviewLayout {
    fn default() -> Self {
        Self {
            width: 670,
            height: 950,
            divider: 25,
        }
    }
}

impl PreviewLayout {
    /// Y coordinate of the top edge of preview `index`.
    pub fn offset_of(&self, index: usize) -> u64 {
        index as u64 * u64::from(self.height + self.divider)
    }

    /// Height of a strip holding `count` previews.
    pub fn total_height(&self, count: usize) -> u64 {
        if count == 0 {
            return 0;
        }
        count as u64 * u64::from(self.height) + (count as u64 - 1) * u64::from(self.divider)
    }

    /// Scroll position (0.0 to 1.0) that brings preview `index` to the top.
    ///
    /// Returns 0.0 for an empty strip.
    pub fn scroll_fraction(&self, index: usize, count: usize) -> f64 {
        let total = self.total_height(count);
        if total == 0 {
            return 0.0;
        }
        self.offset_of(index) as f64 / total as f64
    }

    /// Y coordinate of the separator line drawn above preview `index`.
    ///
    /// The first preview has no separator.
    pub fn separator_y(&self, index: usize) -> Option<f64> {
        if index == 0 {
            return None;
        }
        Some(self.offset_of(index) as f64 - f64::from(self.divider) / 2.0)
    }
}

/// PDF metadata to set on the output document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }

    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let to_string_opt = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: to_string_opt(title),
            author: to_string_opt(author),
            subject: to_string_opt(subject),
            keywords: to_string_opt(keywords),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Complete configuration for a build operation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input files, directories or patterns, in insertion order.
    pub inputs: Vec<PathBuf>,

    /// Output PDF file path.
    pub output: PathBuf,

    /// Edits applied to the page list before export, in order.
    pub edits: Vec<Command>,

    /// Dry run mode - arrange and report without creating output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Metadata to set on output document.
    pub metadata: Metadata,

    /// Page size of image pages.
    pub page_size: PageSize,

    /// Resolution used when `page_size` is [`PageSize::Image`].
    pub image_dpi: u32,
}

impl Config {
    /// Create a configuration with defaults for everything but inputs and output.
    pub fn new(inputs: Vec<PathBuf>, output: PathBuf) -> Self {
        Self {
            inputs,
            output,
            edits: Vec::new(),
            dry_run: false,
            verbose: false,
            quiet: false,
            overwrite_mode: OverwriteMode::default(),
            compression: CompressionLevel::default(),
            metadata: Metadata::default(),
            page_size: PageSize::default(),
            image_dpi: DEFAULT_IMAGE_DPI,
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - Image DPI is zero
    /// - The output path is also an input
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("No input files specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if self.image_dpi == 0 {
            bail!("Image DPI must be at least 1");
        }

        for input in &self.inputs {
            if input == &self.output {
                bail!(
                    "Output file cannot be the same as an input file: {}",
                    self.output.display()
                );
            }
        }

        Ok(())
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_level_from_str() {
        assert_eq!(
            CompressionLevel::from_str("none").unwrap(),
            CompressionLevel::None
        );
        assert_eq!(
            CompressionLevel::from_str("MAXIMUM").unwrap(),
            CompressionLevel::Maximum
        );
        assert!(CompressionLevel::from_str("zip").is_err());
    }

    #[test]
    fn test_page_size_from_str() {
        assert_eq!(PageSize::from_str("image").unwrap(), PageSize::Image);
        assert_eq!(PageSize::from_str("A4").unwrap(), PageSize::A4);
        assert_eq!(PageSize::from_str("letter").unwrap(), PageSize::Letter);
        assert_eq!(PageSize::from_str("preview").unwrap(), PageSize::Preview);
        assert!(PageSize::from_str("tabloid").is_err());
    }

    #[test]
    fn test_page_size_dimensions() {
        assert_eq!(PageSize::Image.fixed_dimensions(), None);
        assert_eq!(PageSize::Letter.fixed_dimensions(), Some((612.0, 792.0)));
        assert_eq!(PageSize::Preview.fixed_dimensions(), Some((670.0, 950.0)));
        assert!(!PageSize::Preview.keeps_aspect_ratio());
        assert!(PageSize::A4.keeps_aspect_ratio());
    }

    #[test]
    fn test_preview_layout_offsets() {
        let layout = PreviewLayout::default();
        assert_eq!(layout.offset_of(0), 0);
        assert_eq!(layout.offset_of(1), 975);
        assert_eq!(layout.offset_of(3), 2925);
    }

    #[test]
    fn test_preview_layout_total_height() {
        let layout = PreviewLayout::default();
        assert_eq!(layout.total_height(0), 0);
        assert_eq!(layout.total_height(1), 950);
        assert_eq!(layout.total_height(2), 950 * 2 + 25);
    }

    #[test]
    fn test_scroll_fraction() {
        let layout = PreviewLayout::default();
        assert_eq!(layout.scroll_fraction(0, 0), 0.0);
        assert_eq!(layout.scroll_fraction(0, 4), 0.0);

        let second = layout.scroll_fraction(1, 2);
        assert!((second - 975.0 / 1925.0).abs() < 1e-9);

        let fractions: Vec<f64> = (0..5).map(|i| layout.scroll_fraction(i, 5)).collect();
        assert!(fractions.windows(2).all(|w| w[0] < w[1]));
        assert!(fractions.iter().all(|f| *f < 1.0));
    }

    #[test]
    fn test_separator_y() {
        let layout = PreviewLayout::default();
        assert_eq!(layout.separator_y(0), None);
        assert_eq!(layout.separator_y(1), Some(962.5));
    }

    #[test]
    fn test_metadata_new_trims_whitespace() {
        let meta = Metadata::new(
            Some("  Title  ".to_string()),
            Some("   ".to_string()),
            None,
            Some("keyword".to_string()),
        );

        assert_eq!(meta.title, Some("Title".to_string()));
        assert_eq!(meta.author, None);
        assert_eq!(meta.subject, None);
        assert_eq!(meta.keywords, Some("keyword".to_string()));
        assert!(!meta.is_empty());
        assert!(Metadata::default().is_empty());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::new(vec![PathBuf::from("a.pdf")], PathBuf::from("out.pdf"));
        assert!(config.validate().is_ok());

        config.inputs.clear();
        assert!(config.validate().is_err());
        config.inputs = vec![PathBuf::from("a.pdf")];

        config.verbose = true;
        config.quiet = true;
        assert!(config.validate().is_err());
        config.verbose = false;
        config.quiet = false;

        config.image_dpi = 0;
        assert!(config.validate().is_err());
        config.image_dpi = DEFAULT_IMAGE_DPI;

        config.output = PathBuf::from("a.pdf");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_should_print() {
        let mut config = Config::new(vec![PathBuf::from("a.png")], PathBuf::from("out.pdf"));
        assert!(config.should_print());

        config.quiet = true;
        assert!(!config.should_print());

        config.dry_run = true;
        assert!(config.should_print());
    }
}
