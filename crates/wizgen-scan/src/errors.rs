use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a scan
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Source directory not found: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("Failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
}
