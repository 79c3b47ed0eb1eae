//! CLI argument parsing for pdfbuilder.
//!
//! This module defines the command-line interface using `clap` and turns
//! parsed arguments into library configuration.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use pdfbuilder::config::{
    CompressionLevel, Config, DEFAULT_IMAGE_DPI, Metadata, OverwriteMode, PageSize, PreviewLayout,
};
use pdfbuilder::error::{BuilderError, Result};
use pdfbuilder::io::PdfReader;
use pdfbuilder::render::ExportOptions;
use pdfbuilder::session::Command;

/// Assemble one PDF from PDF pages and images.
///
/// Every page of every input PDF and every image becomes one page of the
/// output, in the order given. Pages can be reordered with edit commands
/// before the document is written.
#[derive(Parser, Debug)]
#[command(name = "pdfbuilder")]
#[command(version)]
#[command(about = "Assemble one PDF from PDF pages and images", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a PDF from the inputs
    ///
    /// Examples:
    ///   pdfbuilder build cover.jpg report.pdf -o out.pdf
    ///   pdfbuilder build scans/ -o album.pdf --edit "top 5" --edit "remove 2"
    Build(BuildArgs),

    /// Print the numbered page list the inputs would produce
    List(ListArgs),

    /// Write a PNG preview of every page
    Preview(PreviewArgs),

    /// Edit the page list with commands read from stdin
    ///
    /// Type `help` at the prompt for the command list.
    Session(SessionArgs),
}

/// Options that shape the exported document.
#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Page size for image pages
    ///
    /// - image: one image pixel per 1/DPI inch (default)
    /// - a4, letter: fixed paper, image fitted and centred
    /// - preview: 670x950 points, image stretched
    #[arg(long, value_name = "SIZE", default_value = "image", env = "PDFBUILDER_PAGE_SIZE")]
    #[arg(value_parser = ["image", "a4", "letter", "preview"])]
    pub page_size: String,

    /// Resolution used to size image pages with --page-size image
    #[arg(long, value_name = "DPI", default_value_t = DEFAULT_IMAGE_DPI, env = "PDFBUILDER_IMAGE_DPI")]
    pub image_dpi: u32,

    /// Compression level for output PDF
    ///
    /// - none: no stream compression, fastest image encoding
    /// - standard: balanced compression (default)
    /// - maximum: smallest file
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Set title metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Set author metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Set subject metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Set keywords metadata for output PDF (comma-separated)
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    /// Overwrite an existing output file without asking
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite an existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,
}

impl ExportArgs {
    /// Overwrite behaviour selected by the flags.
    pub fn overwrite_mode(&self) -> OverwriteMode {
        if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        }
    }

    /// Export options selected by the flags.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown page size or compression level, or a
    /// zero DPI.
    pub fn export_options(&self) -> Result<ExportOptions> {
        if self.image_dpi == 0 {
            return Err(BuilderError::invalid_config("Image DPI must be at least 1"));
        }

        Ok(ExportOptions {
            page_size: PageSize::from_str(&self.page_size)?,
            image_dpi: self.image_dpi,
            compression: CompressionLevel::from_str(&self.compression)?,
            metadata: Metadata::new(
                self.title.clone(),
                self.author.clone(),
                self.subject.clone(),
                self.keywords.clone(),
            ),
        })
    }
}

/// Arguments of `build`.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Input files, directories or glob patterns (in order)
    #[arg(value_name = "INPUT", required_unless_present = "input_list")]
    pub inputs: Vec<PathBuf>,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Edit command applied to the page list before saving (repeatable)
    ///
    /// Uses the session syntax with 1-based positions, e.g. "top 3",
    /// "move 5 1", "remove 2".
    #[arg(short, long = "edit", value_name = "COMMAND")]
    pub edits: Vec<String>,

    /// Read input paths from a file (one path per line, '-' for stdin)
    #[arg(long, value_name = "FILE")]
    pub input_list: Option<PathBuf>,

    #[command(flatten)]
    pub export: ExportArgs,

    /// Show the page list and stop without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Show detailed information
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl BuildArgs {
    /// Convert the arguments into a validated [`Config`] for `inputs`.
    ///
    /// # Errors
    ///
    /// Returns an error if an option value or an edit command is invalid,
    /// or if the resulting configuration fails validation.
    pub fn to_config(&self, inputs: Vec<PathBuf>) -> Result<Config> {
        let options = self.export.export_options()?;
        let edits = self.parse_edits()?;

        let config = Config {
            inputs,
            output: self.output.clone(),
            edits,
            dry_run: self.dry_run,
            verbose: self.verbose,
            quiet: self.quiet,
            overwrite_mode: self.export.overwrite_mode(),
            compression: options.compression,
            metadata: options.metadata,
            page_size: options.page_size,
            image_dpi: options.image_dpi,
        };

        config.validate().map_err(|e| {
            BuilderError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }

    /// Parse `--edit` values. Only commands that change the page list are
    /// accepted.
    fn parse_edits(&self) -> Result<Vec<Command>> {
        self.edits
            .iter()
            .map(|text| {
                let command: Command = text.parse()?;
                if command.is_edit() {
                    Ok(command)
                } else {
                    Err(BuilderError::invalid_command(
                        text.as_str(),
                        "only page list edits are allowed with --edit",
                    ))
                }
            })
            .collect()
    }

    /// Direct inputs followed by the paths from `--input-list`.
    ///
    /// # Errors
    ///
    /// Returns an error if the list file cannot be read, or if no inputs
    /// remain.
    pub async fn get_all_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut all_inputs = self.inputs.clone();

        if let Some(list) = &self.input_list {
            all_inputs.extend(PdfReader::new().read_input_list(list).await?);
        }

        if all_inputs.is_empty() {
            return Err(BuilderError::invalid_config("No input files specified"));
        }

        Ok(all_inputs)
    }
}

/// Arguments of `list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Input files, directories or glob patterns (in order)
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Print the list as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments of `preview`.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Input files, directories or glob patterns (in order)
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory for the page-NNN.png files (created if missing)
    #[arg(long, value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Preview width in pixels
    #[arg(long, value_name = "PX", default_value_t = PreviewLayout::default().width)]
    pub width: u32,

    /// Preview height in pixels
    #[arg(long, value_name = "PX", default_value_t = PreviewLayout::default().height)]
    pub height: u32,

    /// Also write every preview stacked top to bottom into one PNG
    #[arg(long, value_name = "FILE")]
    pub strip: Option<PathBuf>,

    /// Suppress all non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl PreviewArgs {
    /// Preview geometry selected by the flags.
    pub fn layout(&self) -> Result<PreviewLayout> {
        if self.width == 0 || self.height == 0 {
            return Err(BuilderError::invalid_config(
                "Preview width and height must be at least 1",
            ));
        }
        Ok(PreviewLayout {
            width: self.width,
            height: self.height,
            ..PreviewLayout::default()
        })
    }
}

/// Arguments of `session`.
#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Files, directories or glob patterns to start with
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub export: ExportArgs,

    /// Show detailed information
    #[arg(short, long)]
    pub verbose: bool,
}
