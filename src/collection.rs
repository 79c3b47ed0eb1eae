//! The ordered page list.
//!
//! A [`PageCollection`] holds one [`PageEntry`] per output page. The label
//! list, the preview strip and the export list are all read from the same
//! entries, so position `i` always means the same page in every view.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbuilder::collection::PageCollection;
//! use std::path::Path;
//!
//! # async fn example() -> pdfbuilder::Result<()> {
//! let mut pages = PageCollection::new();
//! pages.add_path(Path::new("report.pdf")).await?;
//! pages.add_path(Path::new("cover.jpg")).await?;
//! pages.move_to_top(pages.len() - 1)?;
//!
//! for (i, label) in pages.labels().iter().enumerate() {
//!     println!("{}. {label}", i + 1);
//! }
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use crate::error::{BuilderError, Result};
use crate::io::PdfReader;
use crate::render::{Preview, Previewer};
use crate::source::PageSource;

/// One page in the list.
#[derive(Debug, Clone, PartialEq)]
pub struct PageEntry {
    /// Where the page comes from.
    pub source: PageSource,
    /// Text shown in the page list.
    pub label: String,
    /// Cached preview, filled by [`PageCollection::render_previews`].
    pub preview: Option<Preview>,
}

impl PageEntry {
    /// Create an entry without a preview.
    pub fn new(source: PageSource) -> Self {
        let label = source.label();
        Self {
            source,
            label,
            preview: None,
        }
    }
}

/// Result of adding a batch of files.
#[derive(Debug, Default)]
pub struct AddReport {
    /// Number of entries appended.
    pub added: usize,
    /// Files that could not be added.
    pub rejected: Vec<BuilderError>,
}

impl AddReport {
    /// True when every file was added.
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Record a file that could not be added.
    ///
    /// Errors that only concern `path` are kept and the batch goes on;
    /// anything else is handed back to stop it.
    pub fn reject(&mut self, path: &Path, error: BuilderError) -> Result<()> {
        if !error.is_recoverable() {
            return Err(error);
        }
        log::warn!("skipping {}: {error}", path.display());
        self.rejected.push(error);
        Ok(())
    }
}

/// Result of filling the preview cache.
#[derive(Debug, Default)]
pub struct RenderReport {
    /// Previews rendered by this call.
    pub rendered: usize,
    /// Entries whose preview failed, with their position.
    pub failed: Vec<(usize, BuilderError)>,
}

/// Ordered list of page sources with an optional selected row.
#[derive(Debug, Clone, Default)]
pub struct PageCollection {
    entries: Vec<PageEntry>,
    selected: Option<usize>,
    reader: PdfReader,
}

impl PageCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection that opens PDFs with `reader`.
    pub fn with_reader(reader: PdfReader) -> Self {
        Self {
            reader,
            ..Self::default()
        }
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no pages.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&PageEntry> {
        self.entries.get(index)
    }

    /// Iterate over entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, PageEntry> {
        self.entries.iter()
    }

    /// Labels in order.
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// Cached previews in order; `None` where nothing has been rendered yet.
    pub fn previews(&self) -> Vec<Option<&Preview>> {
        self.entries.iter().map(|e| e.preview.as_ref()).collect()
    }

    /// Page sources in order, ready for export.
    pub fn sources(&self) -> Vec<PageSource> {
        self.entries.iter().map(|e| e.source.clone()).collect()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(BuilderError::index_out_of_bounds(index, self.entries.len()))
        }
    }

    /// Append one page and return its position.
    pub fn push(&mut self, source: PageSource) -> usize {
        self.entries.push(PageEntry::new(source));
        self.entries.len() - 1
    }

    /// Insert a page at `index`, shifting later pages down.
    ///
    /// `index == len()` appends.
    pub fn insert(&mut self, index: usize, source: PageSource) -> Result<()> {
        if index > self.entries.len() {
            return Err(BuilderError::index_out_of_bounds(index, self.entries.len()));
        }

        self.entries.insert(index, PageEntry::new(source));
        if let Some(selected) = self.selected.as_mut()
            && *selected >= index
        {
            *selected += 1;
        }
        Ok(())
    }

    /// Add one file: every page of a PDF, or a single image.
    ///
    /// Returns the number of pages added.
    ///
    /// # Errors
    ///
    /// Returns an error for rejected extensions, missing files and unreadable
    /// PDFs. Nothing is added in that case.
    pub async fn add_path(&mut self, path: &Path) -> Result<usize> {
        let sources = self.reader.sources_for(path).await?;
        let added = sources.len();
        self.entries.extend(sources.into_iter().map(PageEntry::new));
        log::debug!("added {added} page(s) from {}", path.display());
        Ok(added)
    }

    /// Add several files in order. A bad file is reported and skipped.
    ///
    /// # Errors
    ///
    /// Stops at the first error that is not about a single file (see
    /// [`BuilderError::is_recoverable`]). Pages added before it are kept.
    pub async fn add_paths(&mut self, paths: &[PathBuf]) -> Result<AddReport> {
        self.add_paths_with_progress(paths, |_, _| {}).await
    }

    /// Like [`add_paths`](Self::add_paths), calling `progress(done, total)`
    /// after each file.
    pub async fn add_paths_with_progress<F>(
        &mut self,
        paths: &[PathBuf],
        mut progress: F,
    ) -> Result<AddReport>
    where
        F: FnMut(usize, usize),
    {
        let mut report = AddReport::default();

        for (i, path) in paths.iter().enumerate() {
            match self.add_path(path).await {
                Ok(added) => report.added += added,
                Err(e) => report.reject(path, e)?,
            }
            progress(i + 1, paths.len());
        }

        Ok(report)
    }

    /// Remove the page at `index` and return its source.
    pub fn remove(&mut self, index: usize) -> Result<PageSource> {
        self.check_index(index)?;

        let entry = self.entries.remove(index);
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        Ok(entry.source)
    }

    /// Move the page at `from` so it ends up at `to`.
    ///
    /// The moved page becomes the selected one. Returns its new position.
    pub fn move_to(&mut self, from: usize, to: usize) -> Result<usize> {
        self.check_index(from)?;
        self.check_index(to)?;

        if from != to {
            let entry = self.entries.remove(from);
            self.entries.insert(to, entry);
        }
        self.selected = Some(to);
        Ok(to)
    }

    /// Move the page at `index` to the front.
    pub fn move_to_top(&mut self, index: usize) -> Result<usize> {
        self.move_to(index, 0)
    }

    /// Move the page at `index` to the end.
    pub fn move_to_bottom(&mut self, index: usize) -> Result<usize> {
        self.check_index(index)?;
        self.move_to(index, self.entries.len() - 1)
    }

    /// Swap the page at `index` with the one before it.
    ///
    /// The first page stays where it is.
    pub fn move_up(&mut self, index: usize) -> Result<usize> {
        self.move_to(index, index.saturating_sub(1))
    }

    /// Swap the page at `index` with the one after it.
    ///
    /// The last page stays where it is.
    pub fn move_down(&mut self, index: usize) -> Result<usize> {
        self.check_index(index)?;
        self.move_to(index, (index + 1).min(self.entries.len() - 1))
    }

    /// Remove every page and clear the selection.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.selected = None;
    }

    /// Select the row at `index`.
    pub fn select(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.selected = Some(index);
        Ok(())
    }

    /// Selected row, if any.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Render previews for entries that have none yet.
    ///
    /// A failing entry does not stop the others.
    pub fn render_previews(&mut self, previewer: &Previewer) -> RenderReport {
        let mut report = RenderReport::default();

        for (i, entry) in self.entries.iter_mut().enumerate() {
            if entry.preview.is_some() {
                continue;
            }
            match previewer.render(&entry.source) {
                Ok(preview) => {
                    entry.preview = Some(preview);
                    report.rendered += 1;
                }
                Err(e) => report.failed.push((i, e)),
            }
        }

        report
    }
}

impl<'a> IntoIterator for &'a PageCollection {
    type Item = &'a PageEntry;
    type IntoIter = std::slice::Iter<'a, PageEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<PageSource> for PageCollection {
    fn from_iter<I: IntoIterator<Item = PageSource>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(PageEntry::new).collect(),
            ..Self::default()
        }
    }
}
