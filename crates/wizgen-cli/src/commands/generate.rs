//! `wizgen generate` - scan, version, assemble and write
//!
//! Steps, in order:
//! 1. preflight: load config, validate categories, check the source root
//! 2. load the previous run's history (missing or corrupt -> empty)
//! 3. scan sources in walk order
//! 4. reconcile versions sequentially and assemble the manifest/registry
//! 5. write history, manifest module and registry (skipped with `--dry-run`)
//!
//! A failure in steps 1-3 leaves every output untouched.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use std::path::PathBuf;
use wizgen_config::ResolvedConfig;
use wizgen_logger as logger;
use wizgen_manifest::manifest_writer::{read_registry, write_manifest_module, write_registry};
use wizgen_manifest::{
    Assembler, CategoryMap, Diagnostic, HistorySource, HistoryStore, Manifest, ReconcileSummary,
    Reconciler, RegistryEntry, SkipReason, VersionState,
};
use wizgen_scan::{FileFilter, ScanOptions, SourceScanner};

use crate::common::{category_map, under_root, ProjectOpts};
use crate::errors::PreflightError;

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub project: ProjectOpts,

    /// Source root to scan (default: src)
    #[arg(long, value_name = "DIR")]
    pub src: Option<PathBuf>,

    /// Version history file (default: src/component-history.json)
    #[arg(long, value_name = "FILE")]
    pub history: Option<PathBuf>,

    /// Generated manifest module (default: wizardManifest.ts)
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Registry handoff file (default: scripts/manifest.temp.json)
    #[arg(long, value_name = "FILE")]
    pub registry: Option<PathBuf>,

    /// Run everything and report, but write nothing
    #[arg(long)]
    pub dry_run: bool,
}

/// Everything a run produced
#[derive(Debug)]
pub struct GenerateReport {
    pub files_scanned: usize,
    pub summary: ReconcileSummary,
    pub manifest: Manifest,
    pub registry: Vec<RegistryEntry>,
    pub history: HistoryStore,
    pub diagnostics: Vec<Diagnostic>,
    pub written: bool,
}

/// Entry point for the subcommand
pub fn handle_generate(args: &GenerateArgs) -> Result<()> {
    let (config, categories) = preflight(args)?;
    let report = run_pipeline(&config, categories, Utc::now(), args.dry_run)?;
    report_summary(&config, &report);
    Ok(())
}

/// Resolve configuration and command-line overrides, then check the source root
pub fn preflight(args: &GenerateArgs) -> Result<(ResolvedConfig, CategoryMap), PreflightError> {
    let mut config = args.project.resolve_config()?;
    let root = config.project_root.clone();

    if let Some(src) = &args.src {
        config.src_dir = under_root(&root, src);
    }
    if let Some(history) = &args.history {
        config.history_file = under_root(&root, history);
    }
    if let Some(output) = &args.output {
        config.output_file = under_root(&root, output);
    }
    if let Some(registry) = &args.registry {
        config.registry_file = under_root(&root, registry);
    }

    let categories = category_map(&config)?;

    if !config.src_dir.is_dir() {
        return Err(PreflightError::MissingSrcDir(config.src_dir));
    }

    logger::debug(&format!("Project root: {}", root.display()));
    logger::debug(&format!("Source root: {}", config.src_dir.display()));
    Ok((config, categories))
}

/// Run the pipeline against resolved settings
pub fn run_pipeline(
    config: &ResolvedConfig,
    categories: CategoryMap,
    now: DateTime<Utc>,
    dry_run: bool,
) -> Result<GenerateReport> {
    let (previous, source) = HistoryStore::load_from_path(&config.history_file);
    match source {
        HistorySource::Loaded => logger::debug(&format!(
            "Loaded {} history records from {}",
            previous.len(),
            config.history_file.display()
        )),
        HistorySource::Partial(skipped) => logger::warn(&format!(
            "Ignoring unusable history records in {} ({}); they restart at 1.0.0",
            config.history_file.display(),
            skipped.join(", ")
        )),
        HistorySource::Missing => logger::info(&format!(
            "No history at {}, every entry starts at 1.0.0",
            config.history_file.display()
        )),
        HistorySource::Corrupt(reason) => logger::warn(&format!(
            "Ignoring unreadable history {}: {}",
            config.history_file.display(),
            reason
        )),
    }

    let scanner = SourceScanner::new(
        config.project_root.clone(),
        config.src_dir.clone(),
        ScanOptions {
            filter: FileFilter::new(config.extensions.clone(), config.exclude_suffixes.clone()),
            marker_tag: config.marker_tag.clone(),
            import_strip_prefix: config.import_strip_prefix.clone(),
        },
    );

    logger::spinner_start(&format!("Scanning {}", config.src_dir.display()));
    let scan = match scanner.scan() {
        Ok(scan) => {
            logger::spinner_success(&format!(
                "Scanned {} files under {}",
                scan.files_scanned,
                config.src_dir.display()
            ));
            scan
        }
        Err(e) => {
            logger::spinner_error("Scan failed");
            return Err(e).context("Failed to scan sources");
        }
    };
    let files_scanned = scan.files_scanned;
    let (entries, mut diagnostics) = scan.into_parts();

    let mut reconciler = Reconciler::new(previous, now);
    let mut assembler = Assembler::new(categories);
    for mut entry in entries {
        let outcome = reconciler.reconcile(&mut entry);
        match (outcome.state, outcome.previous.as_deref()) {
            (VersionState::New, _) => {
                logger::event("New", &format!("{} (v{})", entry.name, outcome.version));
            }
            (VersionState::Changed, Some(before)) => logger::event(
                "Updated",
                &format!("{} (v{} -> v{})", entry.name, before, outcome.version),
            ),
            (VersionState::Changed, None) => {
                logger::event("Updated", &format!("{} (v{})", entry.name, outcome.version));
            }
            (VersionState::Unchanged, _) => {
                logger::step(&format!("Unchanged: {} (v{})", entry.name, outcome.version));
            }
        }
        assembler.add(entry);
    }

    let (history, summary, duplicates) = reconciler.finish();
    diagnostics.extend(duplicates);
    let (manifest, registry) = assembler.finish();

    for diagnostic in &diagnostics {
        if is_warning(&diagnostic.reason) {
            logger::warn(&diagnostic.to_string());
        } else {
            logger::debug(&format!("Skipped {}", diagnostic));
        }
    }

    if !dry_run {
        history
            .save_to_path(&config.history_file)
            .with_context(|| format!("Failed to write {}", config.history_file.display()))?;
        write_manifest_module(&manifest, &config.types_import, &config.output_file)
            .with_context(|| format!("Failed to write {}", config.output_file.display()))?;
        write_registry(&registry, &config.registry_file)
            .with_context(|| format!("Failed to write {}", config.registry_file.display()))?;
    }

    Ok(GenerateReport {
        files_scanned,
        summary,
        manifest,
        registry,
        history,
        diagnostics,
        written: !dry_run,
    })
}

/// Skips the operator should see without `-v`
fn is_warning(reason: &SkipReason) -> bool {
    matches!(
        reason,
        SkipReason::DuplicateId { .. } | SkipReason::MissingName
    )
}

fn report_summary(config: &ResolvedConfig, report: &GenerateReport) {
    let summary = &report.summary;
    let counts = format!(
        "{} entries from {} files ({} new, {} updated, {} unchanged)",
        report.manifest.total_entries(),
        report.files_scanned,
        summary.new,
        summary.updated,
        summary.unchanged
    );

    if report.written {
        logger::success(&format!(
            "Generated {} with {}",
            config.output_file.display(),
            counts
        ));
        logger::success(&format!(
            "Wrote registry to {} ({} renderable entries)",
            config.registry_file.display(),
            report.registry.len()
        ));
        logger::info(&format!(
            "History saved to {} ({} records)",
            config.history_file.display(),
            report.history.len()
        ));
    } else {
        logger::success(&format!("Dry run: {}; nothing written", counts));
        let registry_changes = match read_registry(&config.registry_file) {
            Ok(existing) if existing == report.registry => "unchanged",
            Ok(_) => "changed",
            Err(_) => "new",
        };
        logger::info(&format!(
            "Registry would hold {} renderable entries ({})",
            report.registry.len(),
            registry_changes
        ));
    }

    if summary.duplicates > 0 {
        logger::warn(&format!(
            "{} duplicate id(s); the first definition of each id was kept in history and registry",
            summary.duplicates
        ));
    }
}
