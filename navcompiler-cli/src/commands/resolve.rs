//! Resolve command - rebuild route tables from the staging tables.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::warn;

use navcompiler::progress::CancellationToken;
use navcompiler::route::{ResolverConfig, RunSummary};

use super::common::{database_path, open_database, RouteTarget};
use crate::error::CliError;
use crate::progress::{cancel_on_ctrlc, resolve_bar, BarReporter};
use crate::runner::CliRunner;

/// Arguments for the resolve command.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Route tables to rebuild
    #[arg(value_enum, default_value_t = RouteTarget::All)]
    pub target: RouteTarget,

    /// Database file (default: from config)
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Drop segments longer than this many nautical miles
    #[arg(long, value_name = "NM")]
    pub max_length_nm: Option<f64>,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Run the resolve command.
pub fn run(args: ResolveArgs, verbose: bool) -> Result<(), CliError> {
    if let Some(nm) = args.max_length_nm {
        if !nm.is_finite() || nm <= 0.0 {
            return Err(CliError::Config(format!(
                "--max-length-nm must be a positive number, got {}",
                nm
            )));
        }
    }

    let runner = CliRunner::new(verbose)?;
    runner.log_startup("resolve");
    let config = runner.config();

    let store = open_database(&database_path(args.database, config))?;

    let token = CancellationToken::new();
    cancel_on_ctrlc(&token)?;

    let schemas = args.target.schemas();
    let steps = config.progress.max_report_steps;
    let bar = resolve_bar(
        steps * schemas.len() as u64,
        !(args.json || args.no_progress),
    )?;

    let mut summaries: Vec<RunSummary> = Vec::with_capacity(schemas.len());
    for &schema in schemas {
        let mut resolver_config = ResolverConfig::from_config_file(config, schema);
        if let Some(nm) = args.max_length_nm {
            resolver_config = resolver_config.with_max_segment_length_nm(nm);
        }

        let reporter = BarReporter::new(bar.clone(), token.clone());
        let summary = match store.resolve(resolver_config, reporter, steps) {
            Ok(summary) => summary,
            Err(e) => {
                bar.abandon();
                if let Err(rollback) = store.rollback() {
                    warn!(error = %rollback, "Rollback after failed run failed");
                }
                return Err(e.into());
            }
        };

        if summary.aborted {
            bar.abandon_with_message("cancelled");
            store.rollback()?;
            return Err(CliError::Cancelled);
        }
        summaries.push(summary);
    }
    bar.finish_with_message("done");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for summary in &summaries {
            print_summary(summary);
        }
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let candidates = &summary.candidates;
    let output = &summary.output;

    println!();
    println!(
        "{} ({} ms)",
        style(format!("Resolved {} routes", summary.schema)).bold(),
        summary.elapsed_ms
    );
    println!(
        "  Written:     {} rows, {} fragments, {} routes",
        output.rows, output.fragments, output.groups
    );
    println!(
        "  Candidates:  {} records, {} segments accepted, {} duplicates",
        candidates.records, candidates.segments_accepted, candidates.duplicate_segments
    );
    println!(
        "  Dropped:     {} unresolved, {} undecodable, {} longer than {} NM, {} zero length",
        candidates.unresolved_segments,
        candidates.invalid_segments,
        candidates.too_long_segments,
        summary.max_segment_length_nm,
        candidates.degenerate_segments
    );
    println!(
        "  Pruned:      {} contained, {} degenerate fragments",
        candidates.pruned.contained, candidates.pruned.degenerate
    );
    println!(
        "  Navaids:     {} lookups, {} ambiguous, {} not found",
        summary.navaids.lookups, summary.navaids.ambiguous, summary.navaids.not_found
    );
    if let Some(longest) = &output.longest_segment {
        println!(
            "  Longest:     {} {} -> {} ({:.1} NM)",
            longest.name, longest.from_id, longest.to_id, longest.length_nm
        );
    }
    let undecodable = candidates.invalid_segments + summary.navaids.invalid;
    if undecodable > 0 {
        println!(
            "  {}",
            style(format!(
                "{} staging values could not be decoded, see the log for details",
                undecodable
            ))
            .yellow()
        );
    }
}
