//! Config Commands

use anyhow::{bail, Result};
use clap::Subcommand;
use std::path::Path;

use notes_common::ClientConfig;

use crate::output::print_success;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

pub fn execute(cmd: ConfigCommands, config: &ClientConfig, path: &Path) -> Result<()> {
    match cmd {
        ConfigCommands::Show => {
            println!("# {}", path.display());
            print!("{}", toml::to_string_pretty(config)?);
        }

        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            config.save(path)?;
            print_success(&format!("Wrote {}", path.display()));
        }
    }

    Ok(())
}
