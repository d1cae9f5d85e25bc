//! Common types and utilities shared across commands

use clap::{Args, Parser};
use std::path::{Path, PathBuf};
use wizgen_config::{Config, ResolvedConfig};
use wizgen_manifest::CategoryMap;

use crate::errors::PreflightError;

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Only print warnings and errors")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,

    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "Write the run log here instead of ~/.config/wizgen/wizgen.log"
    )]
    pub log_file: Option<PathBuf>,
}

impl GlobalOpts {
    /// Get the effective verbosity level
    /// - 0: quiet/warn only
    /// - 1: debug (-v)
    /// - 2: trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Default tracing directive for the library crates
    pub fn tracing_directive(&self) -> &'static str {
        match self.verbosity_level() {
            0 => "wizgen=warn",
            1 => "wizgen=debug",
            _ => "wizgen=trace",
        }
    }
}

/// Locates the project whose sources are scanned
#[derive(Args, Debug, Clone)]
pub struct ProjectOpts {
    /// Project root; relative settings resolve against it
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub root: PathBuf,
}

impl Default for ProjectOpts {
    fn default() -> Self {
        ProjectOpts {
            root: PathBuf::from("."),
        }
    }
}

impl ProjectOpts {
    /// Load `wizgen.toml` (or `$WIZGEN_CONFIG`) and resolve it against the root
    pub fn resolve_config(&self) -> Result<ResolvedConfig, PreflightError> {
        let config = Config::load(&self.root)?;
        Ok(config.resolve(&self.root)?)
    }

    pub fn config_path(&self) -> PathBuf {
        Config::path(&self.root)
    }
}

/// Category table with the configured aliases applied
pub fn category_map(config: &ResolvedConfig) -> Result<CategoryMap, PreflightError> {
    Ok(CategoryMap::with_aliases(
        config
            .categories
            .iter()
            .map(|(alias, bucket)| (alias.as_str(), bucket.as_str())),
    )?)
}

/// Resolve a command-line path against the project root
pub fn under_root(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_overrides_verbose() {
        let opts = GlobalOpts {
            quiet: true,
            verbose: 2,
            log_file: None,
        };
        assert_eq!(opts.verbosity_level(), 0);
        assert_eq!(opts.tracing_directive(), "wizgen=warn");
    }

    #[test]
    fn test_under_root() {
        let root = Path::new("/work/app");
        assert_eq!(
            under_root(root, Path::new("out/manifest.ts")),
            PathBuf::from("/work/app/out/manifest.ts")
        );
        #[cfg(unix)]
        assert_eq!(
            under_root(root, Path::new("/tmp/manifest.ts")),
            PathBuf::from("/tmp/manifest.ts")
        );
    }
}
