//! `wizgen history` - show the stored version history

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use wizgen_logger as logger;
use wizgen_manifest::{HistorySource, HistoryStore};

use crate::common::{under_root, ProjectOpts};

/// Width of the fingerprint prefix shown in the table
const FINGERPRINT_PREFIX: usize = 12;

#[derive(Args, Debug, Clone, Default)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub project: ProjectOpts,

    /// History file to read (default: from wizgen.toml)
    #[arg(long, value_name = "FILE")]
    pub history: Option<PathBuf>,

    /// Print the raw JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn handle_history(args: &HistoryArgs) -> Result<()> {
    let config = args.project.resolve_config()?;
    let path = args
        .history
        .as_ref()
        .map_or(config.history_file, |p| under_root(&config.project_root, p));

    let (store, source) = HistoryStore::load_from_path(&path);
    match source {
        HistorySource::Loaded => {}
        HistorySource::Partial(skipped) => {
            logger::warn(&format!(
                "Skipping unusable history records in {}: {}",
                path.display(),
                skipped.join(", ")
            ));
        }
        HistorySource::Missing => {
            println!("No history recorded at {}", path.display());
            return Ok(());
        }
        HistorySource::Corrupt(reason) => {
            logger::warn(&format!("Cannot read {}: {}", path.display(), reason));
            return Ok(());
        }
    }

    if args.json {
        println!("{}", store.to_json_string()?);
        return Ok(());
    }

    println!("{} {}", "History:".bold().green(), path.display());
    if store.is_empty() {
        println!("  {}", "(empty)".yellow());
        return Ok(());
    }
    for line in format_rows(&store) {
        println!("  {}", line);
    }
    Ok(())
}

/// One aligned line per record, ids in sorted order
fn format_rows(store: &HistoryStore) -> Vec<String> {
    let id_width = store.iter().map(|(id, _)| id.len()).max().unwrap_or(0);
    store
        .iter()
        .map(|(id, record)| {
            let fingerprint: String = record.fingerprint.chars().take(FINGERPRINT_PREFIX).collect();
            format!(
                "{:<id_width$}  {:<8}  {:<fp_width$}  {}",
                id,
                record.version,
                fingerprint,
                record.last_updated,
                id_width = id_width,
                fp_width = FINGERPRINT_PREFIX,
            )
        })
        .collect()
}
