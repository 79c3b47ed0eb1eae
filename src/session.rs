//! Text commands over a page collection.
//!
//! A [`Session`] owns a [`PageCollection`] and applies [`Command`]s to it,
//! one at a time. Commands are parsed from the same text a user types at
//! the `session` prompt or passes to `build --edit`. Positions in command
//! text are 1-based; [`Command`] stores them zero-based.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbuilder::session::{Command, Session};
//!
//! # async fn example() -> pdfbuilder::Result<()> {
//! let mut session = Session::default();
//! session.apply("add scans/".parse::<Command>()?).await?;
//! session.apply("top 3".parse()?).await?;
//! session.apply("save album.pdf".parse()?).await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::collection::{AddReport, PageCollection};
use crate::config::{Config, OverwriteMode};
use crate::error::{BuilderError, Result};
use crate::io::{PdfWriter, WriteStatistics};
use crate::render::{ExportOptions, ExportStatistics, Exporter, Previewer, compose_strip};
use crate::utils::expand_inputs;

/// Help shown by the `help` command.
pub const HELP: &str = "\
Commands (positions start at 1, quote paths that contain spaces):
  add <path>...      add files, directories or glob patterns
  remove <n>         remove page n
  top <n>            move page n to the top
  bottom <n>         move page n to the bottom
  up <n>             move page n up by one
  down <n>           move page n down by one
  move <from> <to>   move page <from> to position <to>
  select <n>         select page n
  list               show the page list
  reset              remove every page
  preview <dir>      write page previews as PNG files to <dir>
  strip <file>       write all previews stacked into one PNG
  save <file>        write the PDF and start over
  help               show this help
  quit               leave the session";

/// One edit or query on the page list.
///
/// Positions are zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add files, directories or glob patterns.
    Add(Vec<PathBuf>),
    /// Remove a page.
    Remove(usize),
    /// Move a page to the top.
    Top(usize),
    /// Move a page to the bottom.
    Bottom(usize),
    /// Move a page up by one.
    Up(usize),
    /// Move a page down by one.
    Down(usize),
    /// Move a page to an arbitrary position.
    Move {
        /// Current position.
        from: usize,
        /// Target position.
        to: usize,
    },
    /// Select a page.
    Select(usize),
    /// Show the page list.
    List,
    /// Remove every page.
    Reset,
    /// Write previews to a directory.
    Preview(PathBuf),
    /// Write the stacked preview strip to a PNG file.
    Strip(PathBuf),
    /// Export the PDF.
    Save(PathBuf),
    /// Show the command summary.
    Help,
    /// End the session.
    Quit,
}

impl Command {
    /// True for commands that change the page list.
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            Self::Add(_)
                | Self::Remove(_)
                | Self::Top(_)
                | Self::Bottom(_)
                | Self::Up(_)
                | Self::Down(_)
                | Self::Move { .. }
                | Self::Reset
        )
    }
}

fn parse_position(input: &str, word: Option<&str>) -> Result<usize> {
    let word = word.ok_or_else(|| BuilderError::invalid_command(input, "missing page number"))?;
    let position: usize = word
        .parse()
        .map_err(|_| BuilderError::invalid_command(input, format!("'{word}' is not a page number")))?;
    position
        .checked_sub(1)
        .ok_or_else(|| BuilderError::invalid_command(input, "page numbers start at 1"))
}

/// Everything after the command word, as one path. Surrounding quotes are
/// dropped.
fn rest_as_path(input: &str, rest: &str) -> Result<PathBuf> {
    let rest = rest.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| rest.strip_prefix(*q).and_then(|r| r.strip_suffix(*q)))
        .unwrap_or(rest);
    if unquoted.is_empty() {
        return Err(BuilderError::invalid_command(input, "missing path"));
    }
    Ok(PathBuf::from(unquoted))
}

/// Split command arguments on whitespace. Single or double quotes group
/// words, so `add "my scans/a.png" b.png` yields two paths.
fn split_words(input: &str, rest: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in rest.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(BuilderError::invalid_command(input, "unterminated quote"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

impl FromStr for Command {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim();
        let (word, rest) = input
            .split_once(char::is_whitespace)
            .unwrap_or((input, ""));
        let lowered = word.to_lowercase();

        match lowered.as_str() {
            "preview" => return Ok(Self::Preview(rest_as_path(input, rest)?)),
            "strip" => return Ok(Self::Strip(rest_as_path(input, rest)?)),
            "save" => return Ok(Self::Save(rest_as_path(input, rest)?)),
            _ => {}
        }

        let words = split_words(input, rest)?;
        let mut args = words.iter().map(String::as_str);

        let command = match lowered.as_str() {
            "add" => {
                let paths: Vec<PathBuf> = args.by_ref().map(PathBuf::from).collect();
                if paths.is_empty() {
                    return Err(BuilderError::invalid_command(input, "missing path"));
                }
                Self::Add(paths)
            }
            "remove" | "rm" => Self::Remove(parse_position(input, args.next())?),
            "top" => Self::Top(parse_position(input, args.next())?),
            "bottom" => Self::Bottom(parse_position(input, args.next())?),
            "up" => Self::Up(parse_position(input, args.next())?),
            "down" => Self::Down(parse_position(input, args.next())?),
            "move" | "mv" => Self::Move {
                from: parse_position(input, args.next())?,
                to: parse_position(input, args.next())?,
            },
            "select" => Self::Select(parse_position(input, args.next())?),
            "list" | "ls" => Self::List,
            "reset" => Self::Reset,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            "" => return Err(BuilderError::invalid_command(input, "empty command")),
            other => {
                return Err(BuilderError::invalid_command(
                    input,
                    format!("unknown command '{other}'"),
                ));
            }
        };

        if args.next().is_some() {
            return Err(BuilderError::invalid_command(input, "too many arguments"));
        }

        Ok(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add(paths) => {
                f.write_str("add")?;
                for path in paths {
                    let path = path.display().to_string();
                    if path.contains(char::is_whitespace) {
                        write!(f, " \"{path}\"")?;
                    } else {
                        write!(f, " {path}")?;
                    }
                }
                Ok(())
            }
            Self::Remove(n) => write!(f, "remove {}", n + 1),
            Self::Top(n) => write!(f, "top {}", n + 1),
            Self::Bottom(n) => write!(f, "bottom {}", n + 1),
            Self::Up(n) => write!(f, "up {}", n + 1),
            Self::Down(n) => write!(f, "down {}", n + 1),
            Self::Move { from, to } => write!(f, "move {} {}", from + 1, to + 1),
            Self::Select(n) => write!(f, "select {}", n + 1),
            Self::List => f.write_str("list"),
            Self::Reset => f.write_str("reset"),
            Self::Preview(dir) => write!(f, "preview {}", dir.display()),
            Self::Strip(path) => write!(f, "strip {}", path.display()),
            Self::Save(path) => write!(f, "save {}", path.display()),
            Self::Help => f.write_str("help"),
            Self::Quit => f.write_str("quit"),
        }
    }
}

/// What a command did.
#[derive(Debug)]
pub enum Outcome {
    /// Current page labels, in order.
    Listed(Vec<String>),
    /// Files were added.
    Added(AddReport),
    /// A page moved; `to` is its new zero-based position.
    Moved {
        /// New position.
        to: usize,
        /// Preview strip scroll position that shows the moved page.
        scroll: f64,
    },
    /// A page was removed; carries its label.
    Removed(String),
    /// A page was selected.
    Selected {
        /// Selected position.
        index: usize,
        /// Preview strip scroll position that shows the selected page.
        scroll: f64,
    },
    /// The list was cleared.
    Reset,
    /// Previews were written.
    PreviewsWritten {
        /// Files written.
        written: usize,
        /// Pages that could not be previewed.
        failed: Vec<(usize, BuilderError)>,
    },
    /// The stacked preview strip was written.
    StripWritten {
        /// PNG file written.
        path: PathBuf,
        /// Pages in the strip.
        pages: usize,
        /// Pages left blank because they could not be previewed.
        failed: Vec<(usize, BuilderError)>,
    },
    /// The PDF was written and the list cleared.
    Saved {
        /// Document statistics.
        export: ExportStatistics,
        /// File statistics.
        write: WriteStatistics,
    },
    /// Command summary.
    Help(&'static str),
    /// The session should end.
    Quit,
}

/// File name for the preview of page `index` (zero-based).
pub fn preview_file_name(index: usize) -> String {
    format!("page-{:03}.png", index + 1)
}

/// A page collection plus everything needed to preview and export it.
#[derive(Debug)]
pub struct Session {
    collection: PageCollection,
    previewer: Previewer,
    exporter: Exporter,
    writer: PdfWriter,
    overwrite_mode: OverwriteMode,
}

impl Session {
    /// Create a session with the given export options.
    pub fn new(options: ExportOptions) -> Self {
        Self {
            collection: PageCollection::new(),
            previewer: Previewer::default(),
            exporter: Exporter::new(options),
            writer: PdfWriter::new(),
            overwrite_mode: OverwriteMode::default(),
        }
    }

    /// Create a session from a validated configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(ExportOptions::from(config)).with_overwrite_mode(config.overwrite_mode)
    }

    /// Use a different previewer.
    pub fn with_previewer(mut self, previewer: Previewer) -> Self {
        self.previewer = previewer;
        self
    }

    /// Use a different writer.
    pub fn with_writer(mut self, writer: PdfWriter) -> Self {
        self.writer = writer;
        self
    }

    /// Set what `save` does with an existing file.
    pub fn with_overwrite_mode(mut self, mode: OverwriteMode) -> Self {
        self.overwrite_mode = mode;
        self
    }

    /// The page list.
    pub fn collection(&self) -> &PageCollection {
        &self.collection
    }

    /// The page list, mutably.
    pub fn collection_mut(&mut self) -> &mut PageCollection {
        &mut self.collection
    }

    /// The exporter in use.
    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    /// Parse and apply one line of input.
    ///
    /// Blank lines and lines starting with '#' are ignored and yield `None`.
    pub async fn execute_line(&mut self, line: &str) -> Result<Option<Outcome>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let command: Command = line.parse()?;
        self.apply(command).await.map(Some)
    }

    /// Apply one command.
    ///
    /// # Errors
    ///
    /// Position errors leave the collection unchanged. A failed `save`
    /// keeps the collection so the user can fix the problem and retry.
    pub async fn apply(&mut self, command: Command) -> Result<Outcome> {
        log::debug!("applying '{command}'");

        match command {
            Command::Add(paths) => {
                let paths = expand_inputs(&paths)?;
                Ok(Outcome::Added(self.collection.add_paths(&paths).await?))
            }
            Command::Remove(index) => {
                let source = self.collection.remove(index)?;
                Ok(Outcome::Removed(source.label()))
            }
            Command::Top(index) => self.moved(|c| c.move_to_top(index)),
            Command::Bottom(index) => self.moved(|c| c.move_to_bottom(index)),
            Command::Up(index) => self.moved(|c| c.move_up(index)),
            Command::Down(index) => self.moved(|c| c.move_down(index)),
            Command::Move { from, to } => self.moved(|c| c.move_to(from, to)),
            Command::Select(index) => {
                self.collection.select(index)?;
                Ok(Outcome::Selected {
                    index,
                    scroll: self.scroll_to(index),
                })
            }
            Command::List => Ok(Outcome::Listed(
                self.collection.labels().into_iter().map(String::from).collect(),
            )),
            Command::Reset => {
                self.collection.reset();
                Ok(Outcome::Reset)
            }
            Command::Preview(dir) => self.write_previews(&dir).await,
            Command::Strip(path) => self.write_strip(&path).await,
            Command::Save(path) => self.save(&path).await,
            Command::Help => Ok(Outcome::Help(HELP)),
            Command::Quit => Ok(Outcome::Quit),
        }
    }

    fn moved<F>(&mut self, op: F) -> Result<Outcome>
    where
        F: FnOnce(&mut PageCollection) -> Result<usize>,
    {
        let to = op(&mut self.collection)?;
        Ok(Outcome::Moved {
            to,
            scroll: self.scroll_to(to),
        })
    }

    /// Scroll position of the preview strip that brings page `index` to the top.
    pub fn scroll_to(&self, index: usize) -> f64 {
        self.previewer
            .layout()
            .scroll_fraction(index, self.collection.len())
    }

    /// Render missing previews and write all of them to `dir`.
    pub async fn write_previews(&mut self, dir: &Path) -> Result<Outcome> {
        if self.collection.is_empty() {
            return Err(BuilderError::NothingToExport);
        }

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| BuilderError::FailedToCreateOutput {
                path: dir.to_path_buf(),
                source: e,
            })?;

        let report = self.collection.render_previews(&self.previewer);
        log::debug!("rendered {} new preview(s)", report.rendered);

        let mut written = 0;
        for (i, entry) in self.collection.iter().enumerate() {
            if let Some(preview) = &entry.preview {
                preview.save_png(&dir.join(preview_file_name(i)))?;
                written += 1;
            }
        }

        Ok(Outcome::PreviewsWritten {
            written,
            failed: report.failed,
        })
    }

    /// Render missing previews and write them stacked into one PNG at `path`.
    pub async fn write_strip(&mut self, path: &Path) -> Result<Outcome> {
        if self.collection.is_empty() {
            return Err(BuilderError::NothingToExport);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BuilderError::FailedToCreateOutput {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let report = self.collection.render_previews(&self.previewer);
        let previews = self.collection.previews();
        compose_strip(self.previewer.layout(), &previews)?.save_png(path)?;

        Ok(Outcome::StripWritten {
            path: path.to_path_buf(),
            pages: previews.len(),
            failed: report.failed,
        })
    }

    /// Export the collection to `path`, then clear it.
    pub async fn save(&mut self, path: &Path) -> Result<Outcome> {
        if self.collection.is_empty() {
            return Err(BuilderError::NothingToExport);
        }

        self.writer.check_output(path, self.overwrite_mode).await?;
        let (export, write) = self
            .exporter
            .export_to(&self.collection.sources(), path, &self.writer)
            .await?;

        self.collection.reset();
        Ok(Outcome::Saved { export, write })
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ExportOptions::default())
    }
}
