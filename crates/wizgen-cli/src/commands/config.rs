//! `wizgen config` - inspect or scaffold the configuration

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use wizgen_config::Config;
use wizgen_logger as logger;

use crate::common::ProjectOpts;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print every setting after defaults and relative paths are resolved
    Show,
    /// Print the config file location
    Path,
    /// Write a config file with every setting at its default
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn handle_config(action: Option<ConfigAction>, project: &ProjectOpts) -> Result<()> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let config = project.resolve_config()?;
            println!("{}", "Configuration:".bold().green());
            for (key, value) in config.values_iter() {
                println!("  {}: {}", key.cyan(), value);
            }
        }
        ConfigAction::Path => {
            let config_path = project.config_path();
            logger::debug(&format!("Config path resolved to {}", config_path.display()));
            println!("{}", config_path.display());
            if !config_path.exists() {
                println!("  {}", "(not found, using defaults)".yellow());
            }
        }
        ConfigAction::Init { force } => {
            let config_path = project.config_path();
            if config_path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    config_path.display()
                );
            }
            Config::with_defaults().save_to_path(&config_path)?;
            logger::success(&format!("Wrote {}", config_path.display()));
        }
    }
    Ok(())
}
