//! Path conventions for manifest entries
//!
//! - file path: project-relative, `/`-separated (`src/blocks/iot/DeviceCard.tsx`)
//! - import path: extension dropped, source prefix stripped, `./` prepended
//!   (`./blocks/iot/DeviceCard`)

use std::path::{Component, Path};

/// Project-relative path with forward slashes
///
/// Falls back to the path as given when it is not under `root`.
pub fn relative_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Module specifier consumers use to import the entry
pub fn import_path(relative: &str, strip_prefix: &str) -> String {
    let without_ext = strip_extension(relative);

    let prefix = strip_prefix.trim_end_matches('/');
    let stripped = if prefix.is_empty() {
        without_ext
    } else {
        without_ext
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(without_ext)
    };

    format!("./{}", stripped)
}

/// Drop the last extension of the final path segment (`a/Foo.d.ts` -> `a/Foo.d`)
fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..name_start + dot],
        _ => path,
    }
}
