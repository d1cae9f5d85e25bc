//! Version reconciliation against the previous run's history
//!
//! Each entry is compared with the snapshot loaded at startup:
//! - no record for the id            -> New, version 1.0.0
//! - record with the same fingerprint -> Unchanged, stored version kept
//! - record with another fingerprint  -> Changed, patch + 1
//!
//! The snapshot is never mutated, so the result for an entry does not depend on
//! what other entries in the same run did. The first entry to claim an id owns
//! its history record for this run; later entries with the same id are
//! versioned against the same snapshot but reported as duplicates and do not
//! overwrite the record.

use ahash::AHashMap;
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::fingerprint::fingerprint;
use crate::history::{HistoryRecord, HistoryStore};
use crate::types::{Diagnostic, SkipReason, WizardEntry};
use crate::version::Version;

// =============================================================================
// OUTCOMES
// =============================================================================

/// Per-entry reconciliation state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionState {
    New,
    Unchanged,
    Changed,
}

/// What happened to a single entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub state: VersionState,
    pub version: Arc<str>,
    /// Version stored in the previous run, if any
    pub previous: Option<String>,
    /// True when another entry already claimed this id in this run
    pub duplicate: bool,
}

/// Counts for the run summary
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub new: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub duplicates: usize,
}

// =============================================================================
// RECONCILER
// =============================================================================

/// Owns the prior-run snapshot and the history being written for this run
pub struct Reconciler {
    previous: HistoryStore,
    next: HistoryStore,
    /// id -> file that claimed it first in this run
    claimed: AHashMap<Arc<str>, Arc<str>>,
    timestamp: String,
    summary: ReconcileSummary,
    diagnostics: Vec<Diagnostic>,
}

impl Reconciler {
    /// Start a run; records for ids not seen in this run are carried over
    pub fn new(previous: HistoryStore, now: DateTime<Utc>) -> Self {
        Reconciler {
            next: previous.clone(),
            previous,
            claimed: AHashMap::new(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            summary: ReconcileSummary::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Assign a version to `entry` and record it in the outgoing history
    pub fn reconcile(&mut self, entry: &mut WizardEntry) -> Reconciliation {
        let fingerprint = fingerprint(entry);
        let stored = self.previous.get(&entry.id);

        let (state, version) = match stored {
            None => (VersionState::New, Version::INITIAL.to_string()),
            Some(record) if record.fingerprint == fingerprint => {
                (VersionState::Unchanged, record.version.clone())
            }
            Some(record) => {
                let base = record.version.parse::<Version>().unwrap_or_else(|e| {
                    warn!("{} for '{}', bumping from {}", e, entry.id, Version::INITIAL);
                    Version::INITIAL
                });
                (VersionState::Changed, base.bump_patch().to_string())
            }
        };
        let previous = stored.map(|record| record.version.clone());

        entry.version = Arc::from(version.as_str());

        let duplicate = match self.claimed.get(&entry.id) {
            Some(first_file) => {
                debug!(
                    "Duplicate id '{}' in {} (first defined in {})",
                    entry.id, entry.file_path, first_file
                );
                self.diagnostics.push(Diagnostic::new(
                    &entry.file_path,
                    0,
                    SkipReason::DuplicateId {
                        id: entry.id.to_string(),
                        first_file: first_file.to_string(),
                    },
                ));
                self.summary.duplicates += 1;
                true
            }
            None => {
                self.claimed
                    .insert(entry.id.clone(), entry.file_path.clone());
                self.next.insert(
                    &entry.id,
                    HistoryRecord {
                        version: version.clone(),
                        fingerprint,
                        last_updated: self.timestamp.clone(),
                    },
                );
                false
            }
        };

        match state {
            VersionState::New => self.summary.new += 1,
            VersionState::Changed => self.summary.updated += 1,
            VersionState::Unchanged => self.summary.unchanged += 1,
        }
        debug!("{} -> {} ({:?})", entry.id, version, state);

        Reconciliation {
            state,
            version: entry.version.clone(),
            previous,
            duplicate,
        }
    }

    /// Finish the run, returning the history to persist
    pub fn finish(self) -> (HistoryStore, ReconcileSummary, Vec<Diagnostic>) {
        (self.next, self.summary, self.diagnostics)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn entry(name: &str, description: &str, file: &str) -> WizardEntry {
        WizardEntry {
            id: Arc::from(crate::fingerprint::slugify(name)),
            name: Arc::from(name),
            description: Arc::from(description),
            file_path: Arc::from(file),
            ..Default::default()
        }
    }

    fn run(history: HistoryStore, entries: &mut [WizardEntry]) -> (HistoryStore, ReconcileSummary) {
        let mut reconciler = Reconciler::new(history, now());
        for e in entries.iter_mut() {
            reconciler.reconcile(e);
        }
        let (next, summary, _) = reconciler.finish();
        (next, summary)
    }

    #[test]
    fn test_new_entry_gets_initial_version() {
        let mut reconciler = Reconciler::new(HistoryStore::new(), now());
        let mut card = entry("Card", "A card", "src/layout/Card.tsx");

        let result = reconciler.reconcile(&mut card);
        assert_eq!(result.state, VersionState::New);
        assert_eq!(card.version.as_ref(), "1.0.0");
        assert_eq!(result.previous, None);

        let (history, summary, diagnostics) = reconciler.finish();
        assert_eq!(summary.new, 1);
        assert!(diagnostics.is_empty());
        assert!(history.get("card").is_some_and(|r| r.version == "1.0.0"
            && r.last_updated == "2025-01-15T10:00:00.000Z"
            && r.fingerprint == fingerprint(&card)));
    }

    #[test]
    fn test_unchanged_keeps_version() {
        let mut card = entry("Card", "A card", "src/layout/Card.tsx");
        let mut history = HistoryStore::new();
        history.insert(
            "card",
            HistoryRecord {
                version: "1.0.7".to_string(),
                fingerprint: fingerprint(&card),
                last_updated: "2024-06-01T00:00:00.000Z".to_string(),
            },
        );

        let (next, summary) = run(history, std::slice::from_mut(&mut card));
        assert_eq!(card.version.as_ref(), "1.0.7");
        assert_eq!(summary.unchanged, 1);
        assert!(next
            .get("card")
            .is_some_and(|r| r.version == "1.0.7" && r.last_updated.starts_with("2025-01-15")));
    }

    #[test]
    fn test_changed_bumps_patch_only() {
        let mut card = entry("Card", "A card", "src/layout/Card.tsx");
        let mut history = HistoryStore::new();
        history.insert(
            "card",
            HistoryRecord {
                version: "2.3.9".to_string(),
                fingerprint: "stale".to_string(),
                last_updated: "2024-06-01T00:00:00.000Z".to_string(),
            },
        );

        let (next, summary) = run(history, std::slice::from_mut(&mut card));
        assert_eq!(card.version.as_ref(), "2.3.10");
        assert_eq!(summary.updated, 1);
        assert!(next
            .get("card")
            .is_some_and(|r| r.version == "2.3.10" && r.fingerprint == fingerprint(&card)));
    }

    #[test]
    fn test_unparseable_stored_version_bumps_from_initial() {
        let mut card = entry("Card", "A card", "src/layout/Card.tsx");
        let mut history = HistoryStore::new();
        history.insert(
            "card",
            HistoryRecord {
                version: "latest".to_string(),
                fingerprint: "stale".to_string(),
                last_updated: String::new(),
            },
        );

        run(history, std::slice::from_mut(&mut card));
        assert_eq!(card.version.as_ref(), "1.0.1");
    }

    #[test]
    fn test_rename_alone_does_not_bump() {
        // Same id, different display casing, same semantic fields
        let mut first = entry("Device Card", "Live device", "src/DeviceCard.tsx");
        let (history, _) = run(HistoryStore::new(), std::slice::from_mut(&mut first));

        let mut renamed = entry("DeviceCard", "Live device", "src/blocks/DeviceCard.tsx");
        let (_, summary) = run(history, std::slice::from_mut(&mut renamed));
        assert_eq!(summary.unchanged, 1);
        assert_eq!(renamed.version.as_ref(), "1.0.0");
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let mut entries = vec![
            entry("Card", "A card", "src/layout/Card.tsx"),
            entry("Alert", "An alert", "src/feedback/Alert.tsx"),
        ];
        let (first, _) = run(HistoryStore::new(), &mut entries);
        let (second, summary) = run(first.clone(), &mut entries);

        assert_eq!(summary.unchanged, 2);
        for (id, record) in first.iter() {
            assert!(second.get(id).is_some_and(|r| r.version == record.version
                && r.fingerprint == record.fingerprint));
        }
    }

    #[test]
    fn test_untouched_records_are_kept() {
        let mut history = HistoryStore::new();
        history.insert(
            "retired-widget",
            HistoryRecord {
                version: "1.0.4".to_string(),
                fingerprint: "x".to_string(),
                last_updated: "2024-01-01T00:00:00.000Z".to_string(),
            },
        );
        let mut card = entry("Card", "A card", "src/layout/Card.tsx");
        let (next, _) = run(history, std::slice::from_mut(&mut card));

        assert_eq!(next.len(), 2);
        assert!(next.get("retired-widget").is_some_and(|r| r.version == "1.0.4"));
    }

    #[test]
    fn test_duplicate_id_first_claim_wins() {
        let mut entries = vec![
            entry("Card", "Layout card", "src/layout/Card.tsx"),
            entry("Card", "Legacy card", "src/components/layout/Card.tsx"),
        ];
        let mut reconciler = Reconciler::new(HistoryStore::new(), now());
        let first = reconciler.reconcile(&mut entries[0]);
        let second = reconciler.reconcile(&mut entries[1]);
        assert!(!first.duplicate);
        assert!(second.duplicate);
        assert_eq!(second.state, VersionState::New);

        let (history, summary, diagnostics) = reconciler.finish();
        assert_eq!(summary.duplicates, 1);
        assert!(history
            .get("card")
            .is_some_and(|r| r.fingerprint == fingerprint(&entries[0])));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].reason,
            SkipReason::DuplicateId {
                id: "card".to_string(),
                first_file: "src/layout/Card.tsx".to_string(),
            }
        );

        // Re-running with the same sources does not keep bumping
        let (_, summary) = run(history, &mut entries);
        assert_eq!(summary.updated, 1);
        assert_eq!(entries[0].version.as_ref(), "1.0.0");
    }
}
