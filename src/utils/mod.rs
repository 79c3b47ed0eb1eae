//! Utilities for input discovery and formatting.

use crate::{Result, error::BuilderError, source::SourceKind};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`.
///
/// Returns a flattened list of resolved paths, each pattern's matches in
/// the order `glob` yields them (alphabetical).
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns.into_iter() {
        let paths = collect_paths_for_pattern(pattern)?;
        resolved_paths.extend(paths);
    }

    Ok(resolved_paths)
}

/// Expand a single glob pattern into filesystem paths.
///
/// Matches that cannot be read are logged and left out.
fn collect_paths_for_pattern<P: AsRef<str>>(pattern: P) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern.as_ref()).map_err(|err| BuilderError::Other {
        message: format!("Invalid pattern '{}': {err}", pattern.as_ref()),
    })?;

    Ok(skip_unreadable(paths).collect())
}

/// Drop failed entries of a directory walk or glob, logging each one.
fn skip_unreadable<T, E, I>(entries: I) -> impl Iterator<Item = T>
where
    I: IntoIterator<Item = std::result::Result<T, E>>,
    E: Display,
{
    entries.into_iter().filter_map(|entry| match entry {
        Ok(entry) => Some(entry),
        Err(err) => {
            log::warn!("skipping unreadable entry: {err}");
            None
        }
    })
}

/// Collect every accepted page file below `dir`, sorted by path.
///
/// Files with other extensions are skipped silently, so dropping a folder
/// does not produce one error per stray file. Unreadable entries are logged
/// and skipped.
pub fn collect_files_in_directory(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in skip_unreadable(WalkDir::new(dir).sort_by_file_name()) {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        if SourceKind::from_path(&path).is_ok() {
            files.push(path);
        } else {
            log::debug!("skipping {} (unsupported extension)", path.display());
        }
    }

    files
}

/// Check whether a path string contains glob metacharacters.
fn is_glob_pattern(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

/// Resolve user inputs into concrete file paths, keeping their order.
///
/// - existing directories are walked recursively;
/// - non-existing paths containing glob metacharacters are expanded;
/// - everything else is passed through untouched, so missing files and bad
///   extensions are reported later, per file.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut resolved = Vec::with_capacity(inputs.len());

    for input in inputs {
        if input.is_dir() {
            resolved.extend(collect_files_in_directory(input));
            continue;
        }

        let as_str = input.to_string_lossy();
        if !input.exists() && is_glob_pattern(&as_str) {
            let matches = collect_paths_for_patterns([as_str.as_ref()])?;
            if matches.is_empty() {
                log::warn!("pattern '{as_str}' matched no files");
            }
            resolved.extend(matches);
            continue;
        }

        resolved.push(input.clone());
    }

    Ok(resolved)
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
