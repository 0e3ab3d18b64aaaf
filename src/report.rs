//! Run report
//!
//! The report is the pipeline's only output contract: aggregate counters
//! plus an ordered per-file outcome list with enough detail for the caller
//! to render progress lines and the final statistics block. Serializable so
//! an external reporting layer can export it as plain data.

use crate::date::DateSource;
use serde::Serialize;
use std::path::PathBuf;

/// Action taken (or planned, under dry-run) for a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileAction {
    /// Relocated to its planned destination
    Moved,
    /// Copied to its planned destination
    Copied,
    /// Duplicate, intentionally left in place
    SkippedDuplicate,
    /// Duplicate, relocated to the duplicates folder
    MovedToDuplicates,
    /// Duplicate, hard-linked to the keeper's destination
    Linked,
    /// Duplicate, deleted from the source tree
    Removed,
    /// Already at its planned destination; nothing to do
    AlreadyOrganized,
    /// Could not be processed
    Failed,
}

/// Outcome of one file's trip through the pipeline
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    /// Source path
    pub source: PathBuf,
    /// Destination path, when the action produced one
    pub destination: Option<PathBuf>,
    /// Action taken, or that would be taken under dry-run
    pub action: FileAction,
    /// Date provenance, when resolution succeeded
    pub date_source: Option<DateSource>,
    /// Reason for a no-op or failure
    pub reason: Option<String>,
}

/// Aggregate result of one pipeline run
///
/// Built incrementally during the run; immutable once the run completes.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    /// Files discovered by the scan
    pub scanned: usize,
    /// Files classified as duplicates of an earlier-seen keeper
    pub duplicates_found: usize,
    /// Duplicates deleted from the source tree
    pub duplicates_removed: usize,
    /// Unique files moved or copied to their destination
    pub files_organized: usize,
    /// Empty directories removed by the cleanup pass
    pub folders_removed: usize,
    /// Bytes reclaimed by duplicate removal
    pub bytes_freed: u64,
    /// Files that could not be processed
    pub errors: usize,
    /// Whether this run mutated the filesystem
    pub dry_run: bool,
    /// Per-file outcomes in scan order
    pub outcomes: Vec<FileOutcome>,
}

impl RunReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Record an outcome and bump the matching counters
    pub fn record(&mut self, outcome: FileOutcome) {
        match outcome.action {
            FileAction::Moved | FileAction::Copied => self.files_organized += 1,
            FileAction::SkippedDuplicate
            | FileAction::MovedToDuplicates
            | FileAction::Linked => self.duplicates_found += 1,
            FileAction::Removed => {
                self.duplicates_found += 1;
                self.duplicates_removed += 1;
            }
            FileAction::AlreadyOrganized => {}
            FileAction::Failed => self.errors += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Export the report as pretty-printed JSON for external consumers
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Tally resolved dates by provenance across all outcomes
    pub fn date_source_counts(&self) -> DateSourceCounts {
        let mut counts = DateSourceCounts::default();
        for outcome in &self.outcomes {
            match outcome.date_source {
                Some(DateSource::Metadata) => counts.metadata += 1,
                Some(DateSource::FilenamePattern) => counts.filename += 1,
                Some(DateSource::MtimeFallback) => counts.mtime += 1,
                None => {}
            }
        }
        counts
    }

    /// One-line summary in the style of the final statistics block
    pub fn summary(&self) -> String {
        format!(
            "Scanned: {}, Organized: {}, Duplicates: {} (removed {}), Folders removed: {}, Freed: {}, Errors: {}",
            self.scanned,
            self.files_organized,
            self.duplicates_found,
            self.duplicates_removed,
            self.folders_removed,
            human_readable_size(self.bytes_freed),
            self.errors
        )
    }
}

/// How many files resolved their date through each strategy
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct DateSourceCounts {
    pub metadata: usize,
    pub filename: usize,
    pub mtime: usize,
}

/// Convert bytes to a human-readable size string
pub fn human_readable_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} PB", size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(action: FileAction) -> FileOutcome {
        FileOutcome {
            source: PathBuf::from("/src/a.jpg"),
            destination: None,
            action,
            date_source: None,
            reason: None,
        }
    }

    #[test]
    fn test_counters_follow_actions() {
        let mut report = RunReport::new(false);
        report.record(outcome(FileAction::Moved));
        report.record(outcome(FileAction::Copied));
        report.record(outcome(FileAction::SkippedDuplicate));
        report.record(outcome(FileAction::Removed));
        report.record(outcome(FileAction::Failed));

        assert_eq!(report.files_organized, 2);
        assert_eq!(report.duplicates_found, 2);
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.errors, 1);
        assert_eq!(report.outcomes.len(), 5);
    }

    #[test]
    fn test_summary_contains_counts() {
        let mut report = RunReport::new(true);
        report.scanned = 10;
        report.record(outcome(FileAction::Moved));
        let summary = report.summary();
        assert!(summary.contains("Scanned: 10"));
        assert!(summary.contains("Organized: 1"));
    }

    #[test]
    fn test_date_source_counts() {
        let mut report = RunReport::new(false);
        report.record(FileOutcome {
            date_source: Some(DateSource::Metadata),
            ..outcome(FileAction::Moved)
        });
        report.record(FileOutcome {
            date_source: Some(DateSource::FilenamePattern),
            ..outcome(FileAction::Moved)
        });
        report.record(FileOutcome {
            date_source: Some(DateSource::FilenamePattern),
            ..outcome(FileAction::SkippedDuplicate)
        });
        report.record(FileOutcome {
            date_source: Some(DateSource::MtimeFallback),
            ..outcome(FileAction::Copied)
        });
        // Prepare-stage failures carry no date
        report.record(outcome(FileAction::Failed));

        assert_eq!(
            report.date_source_counts(),
            DateSourceCounts {
                metadata: 1,
                filename: 2,
                mtime: 1,
            }
        );
    }

    #[test]
    fn test_human_readable_size() {
        assert_eq!(human_readable_size(512), "512.00 B");
        assert_eq!(human_readable_size(2048), "2.00 KB");
        assert_eq!(human_readable_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_report_serializes() {
        let mut report = RunReport::new(false);
        report.record(outcome(FileAction::Moved));
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"files_organized\":1"));
    }
}
