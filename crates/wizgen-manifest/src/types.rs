//! Type system for the component manifest
//!
//! This module provides:
//! - `WizardEntry`, the record extracted from one annotated comment
//! - Order-preserving `PropDescriptor` maps
//! - The categorized `Manifest` and the flat `RegistryEntry` projection
//! - Structured `Diagnostic` records for everything the pipeline skips

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use crate::errors::ManifestError;

// =============================================================================
// PROP DESCRIPTOR - Ordered key/value pairs
// =============================================================================

/// One documented component prop, e.g. `{name, type, description, default}`
///
/// Keys are free-form and keep their source order. Setting an existing key
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropDescriptor {
    fields: Vec<(Arc<str>, Arc<str>)>,
}

impl PropDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: &str) {
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| k.as_ref() == key) {
            slot.1 = Arc::from(value);
        } else {
            self.fields.push((Arc::from(key), Arc::from(value)));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_ref(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for PropDescriptor {
    fn from(pairs: [(&str, &str); N]) -> Self {
        let mut prop = PropDescriptor::new();
        for (key, value) in pairs {
            prop.set(key, value);
        }
        prop
    }
}

impl Serialize for PropDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key.as_ref(), value.as_ref())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PropDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PropVisitor;

        impl<'de> Visitor<'de> for PropVisitor {
            type Value = PropDescriptor;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of prop attributes to strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut prop = PropDescriptor::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    prop.set(&key, &value);
                }
                Ok(prop)
            }
        }

        deserializer.deserialize_map(PropVisitor)
    }
}

// =============================================================================
// WIZARD ENTRY - One documented component
// =============================================================================

/// A component record extracted from a single `@wizard` comment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WizardEntry {
    pub id: Arc<str>,
    pub name: Arc<str>,
    pub version: Arc<str>,
    pub description: Arc<str>,
    #[serde(default)]
    pub tags: SmallVec<[Arc<str>; 4]>,
    #[serde(default)]
    pub category: Arc<str>,
    #[serde(default)]
    pub props: Vec<PropDescriptor>,
    #[serde(default)]
    pub import_path: Arc<str>,
    #[serde(default)]
    pub file_path: Arc<str>,
}

impl Default for WizardEntry {
    fn default() -> Self {
        WizardEntry {
            id: Arc::from(""),
            name: Arc::from(""),
            version: Arc::from(crate::version::INITIAL_VERSION),
            description: Arc::from(""),
            tags: SmallVec::new(),
            category: Arc::from(""),
            props: Vec::new(),
            import_path: Arc::from(""),
            file_path: Arc::from(""),
        }
    }
}

// =============================================================================
// BUCKETS - Fixed manifest categories
// =============================================================================

/// One of the five canonical manifest buckets
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Bucket {
    #[default]
    Components = 0,
    Layouts = 1,
    Utils = 2,
    Hooks = 3,
    Data = 4,
}

impl Bucket {
    pub const ALL: [Bucket; 5] = [
        Bucket::Components,
        Bucket::Layouts,
        Bucket::Utils,
        Bucket::Hooks,
        Bucket::Data,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Components => "components",
            Bucket::Layouts => "layouts",
            Bucket::Utils => "utils",
            Bucket::Hooks => "hooks",
            Bucket::Data => "data",
        }
    }

    /// Whether entries in this bucket can be inserted by the picker UI
    pub fn is_renderable(self) -> bool {
        matches!(self, Bucket::Components | Bucket::Layouts)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Bucket {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Bucket::ALL
            .into_iter()
            .find(|bucket| bucket.as_str() == s.trim())
            .ok_or_else(|| ManifestError::UnknownBucket(s.to_string()))
    }
}

// =============================================================================
// MANIFEST - Categorized catalog
// =============================================================================

/// Full categorized catalog; field order is the serialized order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    #[serde(default)]
    pub components: Vec<WizardEntry>,
    #[serde(default)]
    pub layouts: Vec<WizardEntry>,
    #[serde(default)]
    pub utils: Vec<WizardEntry>,
    #[serde(default)]
    pub hooks: Vec<WizardEntry>,
    #[serde(default)]
    pub data: Vec<WizardEntry>,
}

impl Manifest {
    pub fn bucket(&self, bucket: Bucket) -> &[WizardEntry] {
        match bucket {
            Bucket::Components => &self.components,
            Bucket::Layouts => &self.layouts,
            Bucket::Utils => &self.utils,
            Bucket::Hooks => &self.hooks,
            Bucket::Data => &self.data,
        }
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<WizardEntry> {
        match bucket {
            Bucket::Components => &mut self.components,
            Bucket::Layouts => &mut self.layouts,
            Bucket::Utils => &mut self.utils,
            Bucket::Hooks => &mut self.hooks,
            Bucket::Data => &mut self.data,
        }
    }

    pub fn push(&mut self, bucket: Bucket, entry: WizardEntry) {
        self.bucket_mut(bucket).push(entry);
    }

    /// Total entries across all buckets
    pub fn total_entries(&self) -> usize {
        Bucket::ALL.iter().map(|b| self.bucket(*b).len()).sum()
    }
}

// =============================================================================
// REGISTRY ENTRY - Minimal projection for the picker UI
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryEntry {
    pub name: Arc<str>,
    pub id: Arc<str>,
    pub path: Arc<str>,
}

impl From<&WizardEntry> for RegistryEntry {
    fn from(entry: &WizardEntry) -> Self {
        RegistryEntry {
            name: entry.name.clone(),
            id: entry.id.clone(),
            path: entry.import_path.clone(),
        }
    }
}

// =============================================================================
// DIAGNOSTICS - Why something was skipped
// =============================================================================

/// Reason a comment, prop or entry did not make it into the output as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A marked comment had no `@name` tag
    MissingName,
    /// A line inside a prop paragraph had no `key: value` shape
    MalformedPropLine { text: String },
    /// A prop paragraph produced no key/value pairs
    EmptyPropParagraph,
    /// A tag outside the known vocabulary
    UnknownTag { title: String },
    /// Another entry earlier in scan order already claimed this id
    DuplicateId { id: String, first_file: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingName => f.write_str("marked comment has no @name tag"),
            SkipReason::MalformedPropLine { text } => {
                write!(f, "prop line without 'key: value': {}", text)
            }
            SkipReason::EmptyPropParagraph => f.write_str("prop paragraph has no key/value pairs"),
            SkipReason::UnknownTag { title } => write!(f, "unknown tag @{}", title),
            SkipReason::DuplicateId { id, first_file } => {
                write!(f, "id '{}' already defined in {}", id, first_file)
            }
        }
    }
}

/// A skipped item with its location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Project-relative file path
    pub file: Arc<str>,
    /// 1-based line in the source file, 0 when not tied to a line
    pub line: usize,
    pub reason: SkipReason,
}

impl Diagnostic {
    pub fn new(file: &Arc<str>, line: usize, reason: SkipReason) -> Self {
        Diagnostic {
            file: file.clone(),
            line,
            reason,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "{}:{}: {}", self.file, self.line, self.reason)
        } else {
            write!(f, "{}: {}", self.file, self.reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prop_descriptor_keeps_order() -> Result<(), serde_json::Error> {
        let prop = PropDescriptor::from([
            ("name", "author"),
            ("type", "string"),
            ("description", "\"The name of the author\""),
        ]);

        let json = serde_json::to_string(&prop)?;
        assert_eq!(
            json,
            r#"{"name":"author","type":"string","description":"\"The name of the author\""}"#
        );

        let parsed: PropDescriptor = serde_json::from_str(&json)?;
        assert_eq!(parsed, prop);
        Ok(())
    }

    #[test]
    fn test_prop_descriptor_set_replaces() {
        let mut prop = PropDescriptor::from([("name", "size"), ("default", "md")]);
        prop.set("default", "lg");

        assert_eq!(prop.len(), 2);
        assert_eq!(prop.get("default"), Some("lg"));
        assert_eq!(prop.iter().next(), Some(("name", "size")));
    }

    #[test]
    fn test_entry_serializes_camel_case_in_field_order() -> Result<(), serde_json::Error> {
        let entry = WizardEntry {
            id: Arc::from("device-card"),
            name: Arc::from("DeviceCard"),
            import_path: Arc::from("./blocks/iot/DeviceCard"),
            file_path: Arc::from("src/blocks/iot/DeviceCard.tsx"),
            ..Default::default()
        };

        let json = serde_json::to_string(&entry)?;
        let keys: Vec<&str> = [
            "\"id\"",
            "\"name\"",
            "\"version\"",
            "\"description\"",
            "\"tags\"",
            "\"category\"",
            "\"props\"",
            "\"importPath\"",
            "\"filePath\"",
        ]
        .into_iter()
        .collect();
        let positions: Vec<usize> = keys.iter().filter_map(|k| json.find(k)).collect();
        assert_eq!(positions.len(), keys.len());
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(json.contains("\"version\":\"1.0.0\""));
        Ok(())
    }

    #[test]
    fn test_bucket_parse_and_renderable() {
        assert!(matches!("layouts".parse::<Bucket>(), Ok(Bucket::Layouts)));
        assert!(matches!(
            "widgets".parse::<Bucket>(),
            Err(ManifestError::UnknownBucket(_))
        ));
        assert!(Bucket::Components.is_renderable());
        assert!(Bucket::Layouts.is_renderable());
        assert!(!Bucket::Hooks.is_renderable());
        assert!(!Bucket::Data.is_renderable());
    }

    #[test]
    fn test_manifest_serializes_all_buckets() -> Result<(), serde_json::Error> {
        let mut manifest = Manifest::default();
        manifest.push(Bucket::Hooks, WizardEntry::default());

        let value = serde_json::to_value(&manifest)?;
        for bucket in Bucket::ALL {
            assert!(value.get(bucket.as_str()).is_some_and(|v| v.is_array()));
        }
        assert_eq!(manifest.total_entries(), 1);
        assert_eq!(manifest.bucket(Bucket::Hooks).len(), 1);
        Ok(())
    }

    #[test]
    fn test_diagnostic_display() {
        let file: Arc<str> = Arc::from("src/ui/Badge.tsx");
        let diag = Diagnostic::new(&file, 12, SkipReason::MissingName);
        assert_eq!(
            diag.to_string(),
            "src/ui/Badge.tsx:12: marked comment has no @name tag"
        );
    }
}
