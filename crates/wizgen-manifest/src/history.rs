//! Persisted version history
//!
//! The history file is the only state carried between runs:
//! `{ [id]: { version, fingerprint, lastUpdated } }`. A missing file is an empty
//! history. A file that cannot be parsed is reported and also treated as empty,
//! which resets every entry to 1.0.0 on the next write. Records are read one by
//! one, so a single unusable record only drops that id.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::errors::ManifestError;
use crate::manifest_writer::write_atomic;

/// Stored state for one id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub version: String,
    /// Empty when absent, which forces a patch bump on the next run
    #[serde(default)]
    pub fingerprint: String,
    #[serde(default)]
    pub last_updated: String,
}

/// How the history was obtained from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistorySource {
    /// Parsed from an existing file
    Loaded,
    /// Parsed, but the listed ids had unusable records and were dropped
    Partial(Vec<String>),
    /// No file at the path
    Missing,
    /// File present but unreadable or not valid history JSON
    Corrupt(String),
}

/// id -> record map, serialized with ids in sorted order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct HistoryStore {
    records: BTreeMap<String, HistoryRecord>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load history, degrading to an empty store on any read or parse failure
    pub fn load_from_path(path: &Path) -> (Self, HistorySource) {
        if !path.exists() {
            debug!("No history file at {:?}, starting empty", path);
            return (HistoryStore::new(), HistorySource::Missing);
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<BTreeMap<String, Value>>(&content).map_err(|e| e.to_string())
            });

        match parsed {
            Ok(raw) => {
                let (store, skipped) = Self::from_raw_records(raw);
                debug!("Loaded {} history records from {:?}", store.len(), path);
                if skipped.is_empty() {
                    (store, HistorySource::Loaded)
                } else {
                    (store, HistorySource::Partial(skipped))
                }
            }
            Err(reason) => {
                debug!("Could not parse history file {:?}: {}", path, reason);
                (HistoryStore::new(), HistorySource::Corrupt(reason))
            }
        }
    }

    fn from_raw_records(raw: BTreeMap<String, Value>) -> (Self, Vec<String>) {
        let mut store = HistoryStore::new();
        let mut skipped = Vec::new();
        for (id, value) in raw {
            match serde_json::from_value::<HistoryRecord>(value) {
                Ok(record) => {
                    store.records.insert(id, record);
                }
                Err(e) => {
                    debug!("Dropping history record '{}': {}", id, e);
                    skipped.push(id);
                }
            }
        }
        (store, skipped)
    }

    /// Pretty-printed JSON (two-space indent)
    pub fn to_json_string(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the whole store with an atomic rename
    pub fn save_to_path(&self, path: &Path) -> Result<(), ManifestError> {
        let content = self.to_json_string()?;
        write_atomic(path, content.as_bytes())
    }

    pub fn get(&self, id: &str) -> Option<&HistoryRecord> {
        self.records.get(id)
    }

    pub fn insert(&mut self, id: &str, record: HistoryRecord) -> Option<HistoryRecord> {
        self.records.insert(id.to_string(), record)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HistoryRecord)> {
        self.records.iter().map(|(id, record)| (id.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    fn record(version: &str, fingerprint: &str) -> HistoryRecord {
        HistoryRecord {
            version: version.to_string(),
            fingerprint: fingerprint.to_string(),
            last_updated: "2025-01-15T10:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_missing_file_is_empty() -> io::Result<()> {
        let temp_dir = TempDir::new()?;
        let (store, source) = HistoryStore::load_from_path(&temp_dir.path().join("h.json"));
        assert!(store.is_empty());
        assert_eq!(source, HistorySource::Missing);
        Ok(())
    }

    #[test]
    fn test_corrupt_file_is_empty() -> io::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("component-history.json");
        fs::write(&path, "{ \"card\": { \"version\": ")?;

        let (store, source) = HistoryStore::load_from_path(&path);
        assert!(store.is_empty());
        assert!(matches!(source, HistorySource::Corrupt(_)));
        Ok(())
    }

    #[test]
    fn test_incomplete_records_keep_their_neighbours() -> io::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("component-history.json");
        fs::write(
            &path,
            r#"{
  "alert": { "fingerprint": "00" },
  "badge": { "version": "1.0.3", "fingerprint": "ab12", "lastUpdated": "2025-01-15T10:00:00.000Z" },
  "card": { "version": "1.0.7", "fingerprint": "cd34" },
  "toast": { "version": "1.0.2" }
}"#,
        )?;

        let (store, source) = HistoryStore::load_from_path(&path);
        assert_eq!(source, HistorySource::Partial(vec!["alert".to_string()]));
        assert_eq!(store.len(), 3);
        assert_eq!(store.get("badge").map(|r| r.version.as_str()), Some("1.0.3"));

        let Some(card) = store.get("card") else {
            panic!("card record kept");
        };
        assert_eq!(card.version, "1.0.7");
        assert_eq!(card.fingerprint, "cd34");
        assert!(card.last_updated.is_empty());

        assert_eq!(store.get("toast").map(|r| r.fingerprint.as_str()), Some(""));
        Ok(())
    }

    #[test]
    fn test_save_and_load() -> io::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("src").join("component-history.json");

        let mut store = HistoryStore::new();
        store.insert("device-card", record("1.0.2", "abc"));
        store.insert("alert", record("1.0.0", "def"));
        assert!(store.save_to_path(&path).is_ok());

        let (loaded, source) = HistoryStore::load_from_path(&path);
        assert_eq!(source, HistorySource::Loaded);
        assert_eq!(loaded, store);
        assert_eq!(
            loaded.get("device-card").map(|r| r.version.as_str()),
            Some("1.0.2")
        );
        Ok(())
    }

    #[test]
    fn test_json_shape() -> Result<(), ManifestError> {
        let mut store = HistoryStore::new();
        store.insert("card", record("1.0.0", "ff00"));
        let json = store.to_json_string()?;
        assert_eq!(
            json,
            "{\n  \"card\": {\n    \"version\": \"1.0.0\",\n    \"fingerprint\": \"ff00\",\n    \"lastUpdated\": \"2025-01-15T10:00:00.000Z\"\n  }\n}"
        );
        Ok(())
    }

    #[test]
    fn test_ids_are_sorted() -> Result<(), ManifestError> {
        let mut store = HistoryStore::new();
        store.insert("toast", record("1.0.0", "a"));
        store.insert("alert", record("1.0.0", "b"));
        let json = store.to_json_string()?;
        assert!(json.find("\"alert\"") < json.find("\"toast\""));
        Ok(())
    }
}
