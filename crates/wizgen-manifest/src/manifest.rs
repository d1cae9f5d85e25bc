//! Manifest assembly - category bucketing and registry building
//!
//! Every entry lands in the categorized manifest. A subset also goes into the
//! registry: renderable buckets only, no hooks or mock data by name, one entry
//! per id (first seen wins).

use ahash::{AHashMap, AHashSet};
use std::sync::Arc;
use tracing::debug;

use crate::errors::ManifestError;
use crate::types::{Bucket, Manifest, RegistryEntry, WizardEntry};

/// Category assumed when an entry has no `@category`
pub const DEFAULT_CATEGORY: &str = "component";

/// Name prefixes that never go into the registry
pub const REGISTRY_EXCLUDED_PREFIXES: &[&str] = &["use", "mock"];

const DEFAULT_CATEGORY_TABLE: &[(&str, Bucket)] = &[
    ("component", Bucket::Components),
    ("components", Bucket::Components),
    ("ui", Bucket::Components),
    ("input", Bucket::Components),
    ("form", Bucket::Components),
    ("feedback", Bucket::Components),
    ("navigation", Bucket::Components),
    ("data-display", Bucket::Components),
    ("layout", Bucket::Layouts),
    ("layouts", Bucket::Layouts),
    ("iot", Bucket::Components),
    ("ai", Bucket::Components),
    ("blocks", Bucket::Components),
    ("util", Bucket::Utils),
    ("utils", Bucket::Utils),
    ("hook", Bucket::Hooks),
    ("hooks", Bucket::Hooks),
    ("data", Bucket::Data),
];

// =============================================================================
// CATEGORY MAP
// =============================================================================

/// Lookup from free-form category strings to manifest buckets
#[derive(Debug, Clone)]
pub struct CategoryMap {
    aliases: AHashMap<Arc<str>, Bucket>,
}

impl Default for CategoryMap {
    fn default() -> Self {
        CategoryMap {
            aliases: DEFAULT_CATEGORY_TABLE
                .iter()
                .map(|(alias, bucket)| (Arc::from(*alias), *bucket))
                .collect(),
        }
    }
}

impl CategoryMap {
    /// Default table extended (or overridden) by `alias -> bucket name` pairs
    pub fn with_aliases<'a, I>(aliases: I) -> Result<Self, ManifestError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut map = CategoryMap::default();
        for (alias, bucket) in aliases {
            let bucket: Bucket = bucket.parse()?;
            map.aliases
                .insert(Arc::from(alias.trim().to_lowercase()), bucket);
        }
        Ok(map)
    }

    /// Bucket for a normalized category; unknown categories go to components
    pub fn bucket_for(&self, category: &str) -> Bucket {
        let key = if category.is_empty() {
            DEFAULT_CATEGORY
        } else {
            category
        };
        self.aliases.get(key).copied().unwrap_or_default()
    }
}

/// Whether a name is reserved for non-renderable entries (hooks, mock data)
pub fn has_excluded_prefix(name: &str) -> bool {
    REGISTRY_EXCLUDED_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

// =============================================================================
// ASSEMBLER
// =============================================================================

/// Collects versioned entries into the manifest and the registry
pub struct Assembler {
    categories: CategoryMap,
    manifest: Manifest,
    registry: Vec<RegistryEntry>,
    seen_registry_ids: AHashSet<Arc<str>>,
}

impl Assembler {
    pub fn new(categories: CategoryMap) -> Self {
        Assembler {
            categories,
            manifest: Manifest::default(),
            registry: Vec::new(),
            seen_registry_ids: AHashSet::new(),
        }
    }

    /// Add one entry; returns the bucket it was placed in
    pub fn add(&mut self, entry: WizardEntry) -> Bucket {
        let bucket = self.categories.bucket_for(&entry.category);

        if bucket.is_renderable() && !has_excluded_prefix(&entry.name) {
            if self.seen_registry_ids.insert(entry.id.clone()) {
                self.registry.push(RegistryEntry::from(&entry));
            } else {
                debug!(
                    "Registry already has id '{}', skipping {}",
                    entry.id, entry.file_path
                );
            }
        }

        self.manifest.push(bucket, entry);
        bucket
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn registry(&self) -> &[RegistryEntry] {
        &self.registry
    }

    pub fn finish(self) -> (Manifest, Vec<RegistryEntry>) {
        (self.manifest, self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, category: &str, file: &str) -> WizardEntry {
        WizardEntry {
            id: Arc::from(crate::fingerprint::slugify(name)),
            name: Arc::from(name),
            category: Arc::from(category),
            import_path: Arc::from(format!("./{}", name)),
            file_path: Arc::from(file),
            ..Default::default()
        }
    }

    #[test]
    fn test_category_lookup() {
        let map = CategoryMap::default();
        assert_eq!(map.bucket_for("layout"), Bucket::Layouts);
        assert_eq!(map.bucket_for("data-display"), Bucket::Components);
        assert_eq!(map.bucket_for("hooks"), Bucket::Hooks);
        assert_eq!(map.bucket_for("util"), Bucket::Utils);
        assert_eq!(map.bucket_for("data"), Bucket::Data);
        assert_eq!(map.bucket_for(""), Bucket::Components);
        assert_eq!(map.bucket_for("charts"), Bucket::Components);
    }

    #[test]
    fn test_custom_aliases() {
        let Ok(map) = CategoryMap::with_aliases([("Templates-Patterns", "layouts")]) else {
            panic!("valid alias");
        };
        assert_eq!(map.bucket_for("templates-patterns"), Bucket::Layouts);
        assert_eq!(map.bucket_for("layout"), Bucket::Layouts);

        assert!(matches!(
            CategoryMap::with_aliases([("charts", "graphs")]),
            Err(ManifestError::UnknownBucket(_))
        ));
    }

    #[test]
    fn test_registry_filters_hooks_and_mocks() {
        let mut assembler = Assembler::new(CategoryMap::default());
        assembler.add(entry("useToast", "hooks", "src/hooks/useToast.ts"));
        assembler.add(entry("mockDevices", "components", "src/data/mockData.ts"));
        assembler.add(entry("DeviceCard", "layout", "src/blocks/iot/DeviceCard.tsx"));
        assembler.add(entry("formatDate", "utils", "src/lib/format.ts"));

        let (manifest, registry) = assembler.finish();
        assert_eq!(manifest.total_entries(), 4);
        assert_eq!(manifest.hooks.len(), 1);
        assert_eq!(manifest.layouts.len(), 1);

        let ids: Vec<&str> = registry.iter().map(|r| r.id.as_ref()).collect();
        assert_eq!(ids, vec!["device-card"]);
        assert_eq!(registry[0].path.as_ref(), "./DeviceCard");
    }

    #[test]
    fn test_prefix_check_is_case_sensitive() {
        assert!(has_excluded_prefix("useChartTheme"));
        assert!(has_excluded_prefix("mockData"));
        assert!(!has_excluded_prefix("UserAvatar"));
        assert!(!has_excluded_prefix("MockupFrame"));
    }

    #[test]
    fn test_registry_dedup_first_wins_manifest_keeps_all() {
        let mut assembler = Assembler::new(CategoryMap::default());
        assembler.add(entry("Card", "layout", "src/components/layout/Card.tsx"));
        assembler.add(entry("Card", "layout", "src/layout/Card.tsx"));

        let (manifest, registry) = assembler.finish();
        assert_eq!(manifest.layouts.len(), 2);
        assert_eq!(registry.len(), 1);
        assert_eq!(
            manifest.layouts[0].file_path.as_ref(),
            "src/components/layout/Card.tsx"
        );
    }

    #[test]
    fn test_missing_category_defaults_to_components() {
        let mut assembler = Assembler::new(CategoryMap::default());
        let bucket = assembler.add(entry("Badge", "", "src/ui/Badge.tsx"));
        assert_eq!(bucket, Bucket::Components);
        assert_eq!(assembler.registry().len(), 1);
        assert_eq!(assembler.manifest().components.len(), 1);
    }
}
