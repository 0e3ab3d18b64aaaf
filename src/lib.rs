//! Media Organizer - date-based media collection organization
//!
//! This library organizes a flat or nested collection of media files into a
//! structured directory hierarchy:
//! - Date resolution from EXIF metadata, filename patterns, or mtime
//! - Exact duplicate detection via SHA-256 content fingerprints
//! - Conflict-safe destination planning with numeric disambiguators
//! - Dry-run mode that reports exactly what a real run would do
//! - Cleanup of directories left empty by relocation
//! - Parallel hashing and date resolution with Rayon

pub mod cleanup;
pub mod cli;
pub mod config;
pub mod date;
pub mod dedupe;
pub mod error;
pub mod hash;
pub mod media;
pub mod pipeline;
pub mod planner;
pub mod report;

pub use cli::Cli;
pub use config::{Config, ConfigError, DedupeAction, FileOperation};
pub use date::{DateSource, ResolvedDate};
pub use dedupe::{Classification, DedupeStrategy, DuplicateIndex};
pub use error::{Error, Result};
pub use hash::ContentFingerprint;
pub use media::{FileKind, MediaFile};
pub use pipeline::Organizer;
pub use planner::PathPlanner;
pub use report::{DateSourceCounts, FileAction, FileOutcome, RunReport};
