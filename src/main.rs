//! Media Organizer CLI entry point
//!
//! Resolves the configuration from arguments and an optional TOML file,
//! runs the pipeline, and renders the final statistics block. All decision
//! logic lives in the library; this binary is presentation only.

use anyhow::{Context, Result};
use clap::Parser;
use media_organizer::report::human_readable_size;
use media_organizer::{Cli, Config, FileAction, Organizer, RunReport};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_sample_config {
        print!("{}", Config::sample_config());
        return Ok(());
    }

    init_logging(cli.verbose);

    let config = match cli.config {
        Some(ref path) => {
            let file_config = Config::load_from_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            cli.merge_with_config(file_config)
        }
        None => cli.to_config(),
    };

    info!(
        source = ?config.source_root,
        destination = ?config.destination_root,
        dry_run = config.dry_run,
        "Starting media organization"
    );

    let mut organizer = Organizer::new(config)?;
    let report = organizer.run()?;

    print_summary(&report);

    if let Some(ref path) = cli.report_json {
        let json = report.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("writing report to {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    if report.errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_summary(report: &RunReport) {
    if report.dry_run {
        println!("DRY RUN - no files were modified");
    }

    // Files that could not be processed, distinct from intentional skips
    for outcome in &report.outcomes {
        if outcome.action == FileAction::Failed {
            let reason = outcome.reason.as_deref().unwrap_or("unknown error");
            eprintln!("ERROR {}: {}", outcome.source.display(), reason);
        }
    }

    let dates = report.date_source_counts();
    println!("{}", "=".repeat(50));
    println!("Total media files found:  {}", report.scanned);
    println!("Dates from metadata:      {}", dates.metadata);
    println!("Dates from filenames:     {}", dates.filename);
    println!("Dates from mtime:         {}", dates.mtime);
    println!("Duplicates found:         {}", report.duplicates_found);
    println!("Duplicates removed:       {}", report.duplicates_removed);
    println!("Files organized:          {}", report.files_organized);
    println!("Empty folders removed:    {}", report.folders_removed);
    println!(
        "Space freed:              {}",
        human_readable_size(report.bytes_freed)
    );
    println!("Errors encountered:       {}", report.errors);
    println!("{}", "=".repeat(50));
}
