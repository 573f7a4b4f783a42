//! navcompiler CLI - resolve staged route legs into ordered route tables.

mod commands;
mod error;
mod progress;
mod runner;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::init::InitArgs;
use commands::resolve::ResolveArgs;
use commands::stats::StatsArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "navcompiler", version, about, long_about = None)]
struct Cli {
    /// Log at debug level to stderr as well as the log file
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the config file and the database tables
    Init(InitArgs),

    /// Rebuild airway and direct route tables from the staging tables
    Resolve(ResolveArgs),

    /// Show row, route and fragment counts of the route tables
    Stats(StatsArgs),

    /// View or change configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Resolve(args) => commands::resolve::run(args, cli.verbose),
        Commands::Stats(args) => commands::stats::run(args),
        Commands::Config { command } => commands::config::run(command),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
