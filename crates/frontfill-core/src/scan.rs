//! Markdown file discovery

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::{FrontfillError, Result};

/// What to pick up while scanning a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Directory names that are never entered
    pub exclude: Vec<String>,
    /// File extensions to match, without the dot, case-insensitive
    pub extensions: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            exclude: Vec::new(),
            extensions: vec!["md".to_string()],
        }
    }
}

impl ScanOptions {
    fn is_excluded(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.exclude.iter().any(|ex| ex == name))
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
    }
}

/// Find Markdown files under `dir`, sorted by path.
///
/// Unreadable entries are logged and skipped.
#[tracing::instrument(skip_all, fields(dir = %dir.display(), recursive = options.recursive))]
pub fn find_markdown_files(dir: &Path, options: &ScanOptions) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(FrontfillError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let max_depth = if options.recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(dir)
        .min_depth(0)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !options.is_excluded(entry));

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if entry.file_type().is_file() && options.matches_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    tracing::info!(count = files.len(), "found markdown files");
    Ok(files)
}
