//! Stable identity and content fingerprints for manifest entries
//!
//! The id is a slug of the declared name. The fingerprint covers only the
//! semantic fields (description, props, tags, category) so that renames and
//! file moves alone never bump a version.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::types::{PropDescriptor, WizardEntry};

/// Derive the entry id from its display name
///
/// - DeviceCard -> device-card
/// - My Component -> my-component
/// - data_table -> data-table
///
/// A hyphen goes between a lowercase letter and a following uppercase letter;
/// runs of whitespace and underscores collapse into one hyphen. Acronyms are
/// not split (`XMLParser` -> `xmlparser`).
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    let mut in_separator = false;

    for ch in name.chars() {
        if ch.is_whitespace() || ch == '_' {
            if !in_separator {
                slug.push('-');
                in_separator = true;
            }
            prev_lower = false;
            continue;
        }
        in_separator = false;

        if ch.is_uppercase() && prev_lower {
            slug.push('-');
        }
        prev_lower = ch.is_lowercase();
        slug.extend(ch.to_lowercase());
    }

    slug
}

/// Canonical field order for hashing; changing it changes every fingerprint
#[derive(Serialize)]
struct FingerprintInput<'a> {
    description: &'a str,
    props: &'a [PropDescriptor],
    tags: &'a [Arc<str>],
    category: &'a str,
}

/// Hex SHA-256 over the compact JSON of the entry's semantic fields
pub fn fingerprint(entry: &WizardEntry) -> String {
    let input = FingerprintInput {
        description: &entry.description,
        props: &entry.props,
        tags: &entry.tags,
        category: &entry.category,
    };
    // Serializing strings and string maps cannot fail
    let bytes = serde_json::to_vec(&input).unwrap_or_default();
    hex::encode(Sha256::digest(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn sample_entry() -> WizardEntry {
        WizardEntry {
            id: Arc::from("device-card"),
            name: Arc::from("DeviceCard"),
            description: Arc::from("A card for a physical device."),
            tags: smallvec![Arc::from("iot"), Arc::from("card")],
            category: Arc::from("layout"),
            props: vec![PropDescriptor::from([("name", "title"), ("type", "string")])],
            import_path: Arc::from("./blocks/iot/DeviceCard"),
            file_path: Arc::from("src/blocks/iot/DeviceCard.tsx"),
            ..Default::default()
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("DeviceCard"), "device-card");
        assert_eq!(slugify("My Component"), "my-component");
        assert_eq!(slugify("data_table"), "data-table");
        assert_eq!(slugify("useChartTheme"), "use-chart-theme");
        assert_eq!(slugify("Stat  Card__Grid"), "stat-card-grid");
        assert_eq!(slugify("XMLParser"), "xmlparser");
        assert_eq!(slugify("card"), "card");
    }

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let fp = fingerprint(&sample_entry());
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp, fingerprint(&sample_entry()));
    }

    #[test]
    fn test_fingerprint_ignores_identity_fields() {
        let base = sample_entry();
        let renamed = WizardEntry {
            id: Arc::from("device-tile"),
            name: Arc::from("DeviceTile"),
            version: Arc::from("4.2.7"),
            import_path: Arc::from("./moved/DeviceTile"),
            file_path: Arc::from("src/moved/DeviceTile.tsx"),
            ..sample_entry()
        };
        assert_eq!(fingerprint(&base), fingerprint(&renamed));
    }

    #[test]
    fn test_fingerprint_tracks_semantic_fields() {
        let base = fingerprint(&sample_entry());

        let mut changed = sample_entry();
        changed.description = Arc::from("A card for a digital twin.");
        assert_ne!(base, fingerprint(&changed));

        let mut changed = sample_entry();
        changed.tags.push(Arc::from("dashboard"));
        assert_ne!(base, fingerprint(&changed));

        let mut changed = sample_entry();
        changed.category = Arc::from("components");
        assert_ne!(base, fingerprint(&changed));

        let mut changed = sample_entry();
        changed.props[0].set("default", "'Untitled'");
        assert_ne!(base, fingerprint(&changed));
    }
}
