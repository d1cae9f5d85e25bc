use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building or persisting the manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to write {}: {source}", path.display())]
    Persist { path: PathBuf, source: io::Error },

    #[error("Failed to serialize manifest data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid version '{0}': expected MAJOR.MINOR.PATCH")]
    InvalidVersion(String),

    #[error("Unknown manifest bucket '{0}' (expected one of: components, layouts, utils, hooks, data)")]
    UnknownBucket(String),
}
