//! Output artifacts
//!
//! - the manifest module: a TypeScript file exporting the categorized manifest
//! - the registry handoff file: a JSON array of `{name, id, path}`
//!
//! Every file is written to a sibling temp file first and renamed into place,
//! so an interrupted run never leaves a half-written artifact.

use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::errors::ManifestError;
use crate::types::{Manifest, RegistryEntry};

/// Name of the exported constant in the manifest module
pub const MANIFEST_EXPORT: &str = "wizardManifest";

/// TypeScript type the exported constant is annotated with
pub const MANIFEST_TYPE: &str = "WizardManifest";

/// Write bytes to `path` via temp file + rename, creating parent directories
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), ManifestError> {
    let persist = |source| ManifestError::Persist {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(persist)?;
        }
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);
    {
        let file = std::fs::File::create(&temp_path).map_err(persist)?;
        let mut writer = std::io::BufWriter::with_capacity(64 * 1024, file);
        writer.write_all(content).map_err(persist)?;
        writer.flush().map_err(persist)?;
    }

    std::fs::rename(&temp_path, path).map_err(persist)?;
    debug!("Wrote {} bytes to {:?}", content.len(), path);
    Ok(())
}

/// Render the generated TypeScript module for a manifest
pub fn render_manifest_module(
    manifest: &Manifest,
    types_import: &str,
) -> Result<String, ManifestError> {
    let json = serde_json::to_string_pretty(manifest)?;
    Ok(format!(
        "// This file is auto-generated by wizgen.\n\
         // Do not modify this file directly.\n\
         import type {{ {ty} }} from '{types_import}';\n\
         \n\
         export const {export}: {ty} = {json} as const;\n",
        ty = MANIFEST_TYPE,
        export = MANIFEST_EXPORT,
    ))
}

/// Write the manifest module
pub fn write_manifest_module(
    manifest: &Manifest,
    types_import: &str,
    output_path: &Path,
) -> Result<(), ManifestError> {
    let content = render_manifest_module(manifest, types_import)?;
    write_atomic(output_path, content.as_bytes())?;
    info!(
        "Manifest module written to {:?} ({} entries)",
        output_path,
        manifest.total_entries()
    );
    Ok(())
}

/// Write the registry handoff file
pub fn write_registry(registry: &[RegistryEntry], output_path: &Path) -> Result<(), ManifestError> {
    let content = serde_json::to_string_pretty(registry)?;
    write_atomic(output_path, content.as_bytes())?;
    info!(
        "Registry written to {:?} ({} entries)",
        output_path,
        registry.len()
    );
    Ok(())
}

/// Read a registry handoff file back
pub fn read_registry(path: &Path) -> Result<Vec<RegistryEntry>, ManifestError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
