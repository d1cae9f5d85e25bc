//! Errors surfaced by the command layer

use std::path::PathBuf;
use thiserror::Error;
use wizgen_config::ConfigError;
use wizgen_manifest::ManifestError;

/// Startup failures; nothing has been written when one of these is returned
#[derive(Error, Debug)]
pub enum PreflightError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Invalid category table: {0}")]
    Categories(#[from] ManifestError),

    #[error("Source directory not found: {}", .0.display())]
    MissingSrcDir(PathBuf),
}

impl PreflightError {
    /// Suggestion printed after the error message
    pub fn hint(&self) -> &'static str {
        match self {
            PreflightError::Config(_) => "Fix or remove wizgen.toml, or point WIZGEN_CONFIG at a valid file",
            PreflightError::Categories(_) => {
                "Category aliases must map to one of: components, layouts, utils, hooks, data"
            }
            PreflightError::MissingSrcDir(_) => {
                "Run from the project root, or pass --root / --src to locate the sources"
            }
        }
    }
}
