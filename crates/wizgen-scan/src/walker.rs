//! Source file discovery
//!
//! Walks the source root depth-first, visiting each directory's entries in
//! file-name order so that "first seen" means the same thing on every machine.
//! Symlinked directories are not followed; symlinked files are included.

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::errors::ScanError;

/// Which file names count as candidate sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    extensions: Vec<String>,
    exclude_suffixes: Vec<String>,
}

impl Default for FileFilter {
    fn default() -> Self {
        FileFilter::new(
            ["tsx", "ts"].map(String::from).to_vec(),
            [".test.tsx", ".stories.tsx"].map(String::from).to_vec(),
        )
    }
}

impl FileFilter {
    /// Extensions are given without the leading dot
    pub fn new(extensions: Vec<String>, exclude_suffixes: Vec<String>) -> Self {
        FileFilter {
            extensions: extensions
                .into_iter()
                .map(|ext| format!(".{}", ext.trim_start_matches('.')))
                .collect(),
            exclude_suffixes,
        }
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.extensions.iter().any(|ext| file_name.ends_with(ext.as_str()))
            && !self
                .exclude_suffixes
                .iter()
                .any(|suffix| file_name.ends_with(suffix.as_str()))
    }
}

/// Collect candidate source files under `root`
///
/// A missing root or an unreadable directory is an error; the caller decides
/// whether that aborts the run.
pub fn collect_source_files(root: &Path, filter: &FileFilter) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|source| ScanError::Walk {
            path: root.to_path_buf(),
            source,
        })?;

        let is_file = if entry.path_is_symlink() {
            entry.path().is_file()
        } else {
            entry.file_type().is_file()
        };
        if !is_file {
            continue;
        }

        if filter.matches(&entry.file_name().to_string_lossy()) {
            files.push(entry.into_path());
        }
    }

    debug!("Found {} candidate files under {:?}", files.len(), root);
    Ok(files)
}
