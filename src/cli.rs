//! CLI argument parsing with clap
//!
//! Thin glue over the pipeline: arguments are merged with an optional TOML
//! config file into a fully resolved [`Config`] before any processing runs.

use crate::config::{Config, DedupeAction, FileOperation};
use crate::dedupe::DedupeStrategy;
use clap::Parser;
use std::path::PathBuf;

/// Media Organizer - date-based media collection organization
///
/// Organizes photos, videos and audio files into a date-structured
/// directory hierarchy, detecting exact duplicates and resolving filename
/// conflicts without ever overwriting existing files.
#[derive(Parser, Debug)]
#[command(name = "media-organizer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as defaults.
    /// CLI arguments override config file settings.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Root directory to scan for media files
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Root directory for organized files
    #[arg(short, long)]
    pub destination: Option<PathBuf>,

    /// Naming pattern, e.g. "{YYYY}/{MM}/{filename}"
    #[arg(short = 'p', long)]
    pub pattern: Option<String>,

    /// Duplicate identification strategy
    #[arg(long, value_enum)]
    pub dedupe_strategy: Option<DedupeStrategy>,

    /// What to do with duplicates
    #[arg(long, value_enum)]
    pub dedupe_action: Option<DedupeAction>,

    /// File operation for unique files
    #[arg(short = 'O', long, value_enum)]
    pub operation: Option<FileOperation>,

    /// Only scan these extensions (lowercased, no dot)
    #[arg(long, num_args = 1..)]
    pub include_ext: Option<Vec<String>>,

    /// Never scan these extensions
    #[arg(long, num_args = 1..)]
    pub exclude_ext: Option<Vec<String>>,

    /// Path prefixes to skip entirely
    #[arg(long, num_args = 1..)]
    pub exclude_path: Option<Vec<PathBuf>>,

    /// Number of worker threads (0 = auto)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Do not restore source modification times on organized files
    #[arg(long)]
    pub no_preserve_timestamps: bool,

    /// Dry run mode - show what would be done without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Write the full run report as JSON to this path
    #[arg(long)]
    pub report_json: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print a sample configuration file and exit
    #[arg(long)]
    pub print_sample_config: bool,
}

impl Cli {
    /// Merge CLI arguments over a config; CLI takes precedence
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref source) = self.source {
            config.source_root = source.clone();
        }
        if let Some(ref destination) = self.destination {
            config.destination_root = destination.clone();
        }
        if let Some(ref pattern) = self.pattern {
            config.naming_pattern = pattern.clone();
        }
        if let Some(strategy) = self.dedupe_strategy {
            config.dedupe_strategy = strategy;
        }
        if let Some(action) = self.dedupe_action {
            config.dedupe_action = action;
        }
        if let Some(operation) = self.operation {
            config.operation = operation;
        }
        if let Some(ref include) = self.include_ext {
            config.include_extensions = include.clone();
        }
        if let Some(ref exclude) = self.exclude_ext {
            config.exclude_extensions = exclude.clone();
        }
        if let Some(ref paths) = self.exclude_path {
            config.exclude_paths = paths.clone();
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if self.no_preserve_timestamps {
            config.preserve_timestamps = false;
        }
        if self.dry_run {
            config.dry_run = true;
        }

        config
    }

    /// Build a Config from CLI arguments alone
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}
