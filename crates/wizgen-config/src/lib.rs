//! Generator configuration
//!
//! Settings live in `wizgen.toml` at the project root. `WIZGEN_CONFIG` points at
//! a different file for tests and isolated runs. Every key is optional; missing
//! keys fall back to the layout of the component library this tool was built
//! for (`src/`, `wizardManifest.ts`, `scripts/manifest.temp.json`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file name looked up at the project root
pub const CONFIG_FILE_NAME: &str = "wizgen.toml";

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "WIZGEN_CONFIG";

pub const DEFAULT_SRC_DIR: &str = "src";
pub const DEFAULT_HISTORY_FILE: &str = "src/component-history.json";
pub const DEFAULT_OUTPUT_FILE: &str = "wizardManifest.ts";
pub const DEFAULT_REGISTRY_FILE: &str = "scripts/manifest.temp.json";
pub const DEFAULT_MARKER_TAG: &str = "wizard";
pub const DEFAULT_IMPORT_STRIP_PREFIX: &str = "src/";
pub const DEFAULT_TYPES_IMPORT: &str = "./src/lib/types/wizard";
pub const DEFAULT_EXTENSIONS: &[&str] = &["tsx", "ts"];
pub const DEFAULT_EXCLUDE_SUFFIXES: &[&str] = &[".test.tsx", ".stories.tsx"];

/// Error type for loading and saving configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Reading or writing the config file failed
    Io(PathBuf, std::io::Error),
    /// The config file is not valid TOML for this schema
    Parse(PathBuf, toml::de::Error),
    /// Serializing the config failed
    Serialize(toml::ser::Error),
    /// A value is present but unusable
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Failed to access {}: {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Failed to parse {}: {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Failed to serialize config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Raw configuration as stored in `wizgen.toml`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_suffixes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_strip_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types_import: Option<String>,
    /// Extra category aliases, e.g. `charts = "components"`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, String>,
}

impl Config {
    /// Resolve the config file location for a project root
    pub fn path(project_root: &Path) -> PathBuf {
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }
        project_root.join(CONFIG_FILE_NAME)
    }

    /// Load the config for a project root, returning defaults if the file doesn't exist
    pub fn load(project_root: &Path) -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::path(project_root))
    }

    /// Load the config from a specific file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::Io(parent.to_path_buf(), e))?;
            }
        }
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        fs::write(path, content).map_err(|e| ConfigError::Io(path.to_path_buf(), e))
    }

    pub fn is_empty(&self) -> bool {
        *self == Config::default()
    }

    /// Every key set to its default, as a starting point for `wizgen.toml`
    pub fn with_defaults() -> Self {
        Config {
            src_dir: Some(DEFAULT_SRC_DIR.to_string()),
            history_file: Some(DEFAULT_HISTORY_FILE.to_string()),
            output_file: Some(DEFAULT_OUTPUT_FILE.to_string()),
            registry_file: Some(DEFAULT_REGISTRY_FILE.to_string()),
            extensions: Some(owned_list(DEFAULT_EXTENSIONS)),
            exclude_suffixes: Some(owned_list(DEFAULT_EXCLUDE_SUFFIXES)),
            marker_tag: Some(DEFAULT_MARKER_TAG.to_string()),
            import_strip_prefix: Some(DEFAULT_IMPORT_STRIP_PREFIX.to_string()),
            types_import: Some(DEFAULT_TYPES_IMPORT.to_string()),
            categories: BTreeMap::new(),
        }
    }

    /// Resolve every setting against a project root, filling in defaults
    pub fn resolve(&self, project_root: &Path) -> Result<ResolvedConfig, ConfigError> {
        let extensions = self.extensions.clone().unwrap_or_else(|| owned_list(DEFAULT_EXTENSIONS));
        if extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "extensions must list at least one file extension".to_string(),
            ));
        }
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .collect();

        let marker_tag = self
            .marker_tag
            .clone()
            .unwrap_or_else(|| DEFAULT_MARKER_TAG.to_string());
        let marker_tag = marker_tag.trim_start_matches('@').trim().to_string();
        if marker_tag.is_empty() {
            return Err(ConfigError::Invalid("marker-tag must not be empty".to_string()));
        }

        let join = |value: &Option<String>, default: &str| {
            project_root.join(value.as_deref().unwrap_or(default))
        };

        Ok(ResolvedConfig {
            project_root: project_root.to_path_buf(),
            src_dir: join(&self.src_dir, DEFAULT_SRC_DIR),
            history_file: join(&self.history_file, DEFAULT_HISTORY_FILE),
            output_file: join(&self.output_file, DEFAULT_OUTPUT_FILE),
            registry_file: join(&self.registry_file, DEFAULT_REGISTRY_FILE),
            extensions,
            exclude_suffixes: self
                .exclude_suffixes
                .clone()
                .unwrap_or_else(|| owned_list(DEFAULT_EXCLUDE_SUFFIXES)),
            marker_tag,
            import_strip_prefix: self
                .import_strip_prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_IMPORT_STRIP_PREFIX.to_string()),
            types_import: self
                .types_import
                .clone()
                .unwrap_or_else(|| DEFAULT_TYPES_IMPORT.to_string()),
            categories: self
                .categories
                .iter()
                .map(|(alias, bucket)| (alias.trim().to_lowercase(), bucket.trim().to_lowercase()))
                .collect(),
        })
    }
}

fn owned_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

/// Fully resolved settings for one generator run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub project_root: PathBuf,
    pub src_dir: PathBuf,
    pub history_file: PathBuf,
    pub output_file: PathBuf,
    pub registry_file: PathBuf,
    pub extensions: Vec<String>,
    pub exclude_suffixes: Vec<String>,
    pub marker_tag: String,
    pub import_strip_prefix: String,
    pub types_import: String,
    pub categories: BTreeMap<String, String>,
}

impl ResolvedConfig {
    /// Key/value pairs for display
    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        let mut values = vec![
            ("project-root", self.project_root.display().to_string()),
            ("src-dir", self.src_dir.display().to_string()),
            ("history-file", self.history_file.display().to_string()),
            ("output-file", self.output_file.display().to_string()),
            ("registry-file", self.registry_file.display().to_string()),
            ("extensions", self.extensions.join(", ")),
            ("exclude-suffixes", self.exclude_suffixes.join(", ")),
            ("marker-tag", format!("@{}", self.marker_tag)),
            ("import-strip-prefix", self.import_strip_prefix.clone()),
            ("types-import", self.types_import.clone()),
        ];
        for (alias, bucket) in &self.categories {
            values.push(("category", format!("{} -> {}", alias, bucket)));
        }
        values
    }
}
