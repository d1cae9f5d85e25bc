//! Source scanning for wizgen
//!
//! Walks the source tree, pulls marked doc-comment blocks out of each file and
//! parses them into unversioned manifest entries. Files are read and parsed in
//! parallel; results come back in walk order so that everything downstream
//! (version history, registry de-duplication) sees a deterministic sequence.

pub mod annotation;
pub mod errors;
pub mod extractor;
pub mod naming;
pub mod walker;

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use wizgen_manifest::{Diagnostic, WizardEntry};

pub use annotation::{parse_annotation, parse_block, ParsedBlock};
pub use errors::ScanError;
pub use extractor::{extract_blocks, RawCommentBlock};
pub use walker::{collect_source_files, FileFilter};

/// Default marker tag (`@wizard`)
pub const DEFAULT_MARKER: &str = "wizard";

/// What to scan for and how to name what is found
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub filter: FileFilter,
    pub marker_tag: String,
    pub import_strip_prefix: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            filter: FileFilter::default(),
            marker_tag: DEFAULT_MARKER.to_string(),
            import_strip_prefix: "src/".to_string(),
        }
    }
}

/// Entries and diagnostics from one source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileScan {
    pub file_path: Arc<str>,
    pub entries: Vec<WizardEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse every marked block in `content`
///
/// `file_path` is the project-relative path recorded on each entry.
pub fn scan_source(content: &str, file_path: &str, options: &ScanOptions) -> FileScan {
    let file_path: Arc<str> = Arc::from(file_path);
    let import_path: Arc<str> =
        Arc::from(naming::import_path(&file_path, &options.import_strip_prefix));

    let mut scan = FileScan {
        file_path: file_path.clone(),
        ..Default::default()
    };

    for block in extract_blocks(content) {
        let Some(parsed) = parse_block(&block, &file_path, &options.marker_tag) else {
            continue;
        };
        scan.diagnostics.extend(parsed.diagnostics);
        if let Some(mut entry) = parsed.entry {
            entry.file_path = file_path.clone();
            entry.import_path = import_path.clone();
            scan.entries.push(entry);
        }
    }

    scan
}

/// Everything found in one scan, in walk order
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub files_scanned: usize,
    pub files: Vec<FileScan>,
}

impl ScanReport {
    pub fn entries(&self) -> impl Iterator<Item = &WizardEntry> {
        self.files.iter().flat_map(|file| file.entries.iter())
    }

    pub fn entry_count(&self) -> usize {
        self.files.iter().map(|file| file.entries.len()).sum()
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.files.iter().flat_map(|file| file.diagnostics.iter())
    }

    /// Split into the ordered entry list and all diagnostics
    pub fn into_parts(self) -> (Vec<WizardEntry>, Vec<Diagnostic>) {
        let mut entries = Vec::new();
        let mut diagnostics = Vec::new();
        for file in self.files {
            entries.extend(file.entries);
            diagnostics.extend(file.diagnostics);
        }
        (entries, diagnostics)
    }
}

/// Scans a source root below a project root
pub struct SourceScanner {
    project_root: PathBuf,
    src_dir: PathBuf,
    options: ScanOptions,
}

impl SourceScanner {
    pub fn new(project_root: PathBuf, src_dir: PathBuf, options: ScanOptions) -> Self {
        SourceScanner {
            project_root,
            src_dir,
            options,
        }
    }

    /// Walk, read and parse; any walk or read failure aborts the scan
    pub fn scan(&self) -> Result<ScanReport, ScanError> {
        let files = collect_source_files(&self.src_dir, &self.options.filter)?;
        debug!(
            "Scanning {} files under {:?} for @{}",
            files.len(),
            self.src_dir,
            self.options.marker_tag
        );

        let scans = files
            .par_iter()
            .map(|path| self.scan_file(path))
            .collect::<Result<Vec<_>, _>>()?;

        let report = ScanReport {
            files_scanned: files.len(),
            files: scans,
        };
        info!(
            "Scanned {} files, found {} annotated entries",
            report.files_scanned,
            report.entry_count()
        );
        Ok(report)
    }

    fn scan_file(&self, path: &Path) -> Result<FileScan, ScanError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let relative = naming::relative_path(path, &self.project_root);
        Ok(scan_source(&content, &relative, &self.options))
    }
}
