//! Init command - create the config file and database tables.

use std::path::PathBuf;

use clap::Args;
use navcompiler::config::{config_file_path, ConfigFile};
use navcompiler::store::SqliteStore;

use crate::error::CliError;

/// Arguments for the init command.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Database file to create; stored in the config file
    #[arg(long)]
    pub database: Option<PathBuf>,
}

/// Run the init command.
pub fn run(args: InitArgs) -> Result<(), CliError> {
    let mut config = ConfigFile::load()?;
    if let Some(database) = args.database {
        config.database.path = database;
    }

    let path = config.database.path.clone();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            CliError::Config(format!("Cannot create {}: {}", parent.display(), e))
        })?;
    }

    let store = SqliteStore::open(&path)?;
    store.create_schema()?;
    config.save()?;

    println!("Database:           {}", path.display());
    println!("Configuration file: {}", config_file_path().display());
    println!();
    println!("Fill the waypoint and staging tables, then run 'navcompiler resolve'.");
    Ok(())
}
