//! Stats command - row counts of the route tables.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;
use navcompiler::config::ConfigFile;
use navcompiler::route::RouteSchema;
use navcompiler::store::TableStats;

use super::common::{database_path, open_database};
use crate::error::CliError;

/// Arguments for the stats command.
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Database file (default: from config)
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Print counts as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the stats command.
pub fn run(args: StatsArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let path = database_path(args.database, &config);
    let store = open_database(&path)?;

    let mut tables = Vec::with_capacity(RouteSchema::ALL.len());
    for schema in RouteSchema::ALL {
        tables.push((schema, store.table_stats(schema)?));
    }

    if args.json {
        let value: BTreeMap<&str, &TableStats> = tables
            .iter()
            .map(|(schema, stats)| (schema.output_table(), stats))
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Database: {}", path.display());
    println!();
    println!("{:<14} {:>10} {:>10} {:>10}", "Table", "Rows", "Routes", "Fragments");
    for (schema, stats) in &tables {
        println!(
            "{:<14} {:>10} {:>10} {:>10}",
            schema.output_table(),
            stats.rows,
            stats.routes,
            stats.fragments
        );
    }
    Ok(())
}
