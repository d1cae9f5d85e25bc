//! wizgen manifest model
//!
//! Types and operations for the component manifest: entries and props,
//! fingerprints, the persisted version history, reconciliation of versions
//! against that history, and assembly/serialization of the manifest module and
//! the registry handoff file.

pub mod errors;
pub mod fingerprint;
pub mod history;
pub mod manifest;
pub mod manifest_writer;
pub mod reconcile;
pub mod types;
pub mod version;

pub use errors::ManifestError;
pub use fingerprint::{fingerprint, slugify};
pub use history::{HistoryRecord, HistorySource, HistoryStore};
pub use manifest::{Assembler, CategoryMap};
pub use reconcile::{ReconcileSummary, Reconciler, Reconciliation, VersionState};
pub use types::{
    Bucket, Diagnostic, Manifest, PropDescriptor, RegistryEntry, SkipReason, WizardEntry,
};
pub use version::Version;
