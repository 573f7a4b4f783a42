//! Common types and helpers shared across CLI commands.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use navcompiler::config::ConfigFile;
use navcompiler::route::RouteSchema;
use navcompiler::store::SqliteStore;

use crate::error::CliError;

/// Route tables selected on the command line.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum RouteTarget {
    /// Victor and jet airways
    Airways,
    /// Direct routes
    Direct,
    /// Airways, then direct routes
    #[default]
    All,
}

impl RouteTarget {
    pub fn schemas(self) -> &'static [RouteSchema] {
        match self {
            RouteTarget::Airways => &[RouteSchema::Airway],
            RouteTarget::Direct => &[RouteSchema::DirectRoute],
            RouteTarget::All => &RouteSchema::ALL,
        }
    }
}

/// Database path: CLI argument first, then config.
pub fn database_path(cli_path: Option<PathBuf>, config: &ConfigFile) -> PathBuf {
    cli_path.unwrap_or_else(|| config.database.path.clone())
}

/// Open an existing database.
pub fn open_database(path: &Path) -> Result<SqliteStore, CliError> {
    if !path.exists() {
        return Err(CliError::Config(format!(
            "Database {} not found. Run 'navcompiler init' or pass --database.",
            path.display()
        )));
    }
    Ok(SqliteStore::open(path)?)
}
