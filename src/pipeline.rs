//! Organizer pipeline
//!
//! Orchestrates the full run: scan -> hash -> date-resolve -> dedupe ->
//! plan -> apply -> cleanup. Scan order is fixed (lexicographic full-path
//! order) before any parallel work begins, because keeper selection depends
//! on it. Hashing and date resolution run in parallel per file; dedupe and
//! planning are applied sequentially in scan order over the collected
//! results, so repeated runs against an unmodified tree produce identical
//! reports.
//!
//! Every per-file failure is recorded in the report and processing
//! continues; only an invalid configuration aborts the run.

use crate::cleanup::remove_empty_directories;
use crate::config::{Config, DedupeAction, FileOperation};
use crate::date::{self, ResolvedDate, exif};
use crate::dedupe::{Classification, DedupeKey, DedupeStrategy, DuplicateIndex};
use crate::error::{Error, Result};
use crate::hash::{ContentFingerprint, fingerprint};
use crate::media::MediaFile;
use crate::planner::PathPlanner;
use crate::report::{FileAction, FileOutcome, RunReport};
use filetime::FileTime;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{Level, debug, info, span, warn};
use walkdir::WalkDir;

/// Buffer size for cross-volume copies (256KB)
const COPY_BUFFER_SIZE: usize = 256 * 1024;

/// Per-file data gathered by the parallel stage
struct PreparedFile {
    media: MediaFile,
    fingerprint: Option<ContentFingerprint>,
    date: ResolvedDate,
    camera: Option<String>,
}

/// Runs one organization pass over the source tree
pub struct Organizer {
    config: Arc<Config>,
}

impl Organizer {
    /// Create an organizer, validating the configuration up front.
    ///
    /// Validation failure is the only run-level error; everything after
    /// this point degrades to per-file error entries.
    pub fn new(config: Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::Config(e.to_string()))?;

        if config.threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(config.threads)
                .build_global()
                .ok(); // Ignore if already initialized
        }

        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Run the pipeline and produce the report
    pub fn run(&mut self) -> Result<RunReport> {
        let _span = span!(Level::INFO, "organizer_run").entered();
        let config = Arc::clone(&self.config);
        let mut report = RunReport::new(config.dry_run);

        info!(source = ?config.source_root, "Scanning source tree");
        let files = self.collect_files()?;
        report.scanned = files.len();
        info!(count = files.len(), "Found media files");

        if files.is_empty() {
            info!("No files to process");
            return Ok(report);
        }

        if !config.dry_run {
            fs::create_dir_all(&config.destination_root)?;
        }

        // Hashing and date resolution are read-only and independent per
        // file; order is preserved by the collect
        info!("Resolving dates and fingerprints");
        let want_fingerprint = config.dedupe_strategy == DedupeStrategy::Hash;
        let want_camera = config.naming_pattern.contains("{camera}");
        let prepared: Vec<std::result::Result<PreparedFile, (MediaFile, Error)>> = files
            .into_par_iter()
            .map(|media| prepare_file(media, want_fingerprint, want_camera))
            .collect();

        // Dedupe and planning mutate shared indexes; single writer, scan order
        let mut index = DuplicateIndex::new();
        let mut planner = PathPlanner::new(&config.destination_root, &config.naming_pattern);
        let mut duplicates_planner = PathPlanner::new(&config.duplicates_dir(), "{filename}");
        let mut keeper_destinations: HashMap<PathBuf, PathBuf> = HashMap::new();
        let mut relocated: HashSet<PathBuf> = HashSet::new();

        for item in prepared {
            let file = match item {
                Ok(file) => file,
                Err((media, error)) => {
                    warn!(path = ?media.path, error = %error, "Failed to prepare file");
                    report.record(FileOutcome {
                        source: media.path,
                        destination: None,
                        action: FileAction::Failed,
                        date_source: None,
                        reason: Some(error.to_string()),
                    });
                    continue;
                }
            };

            let key = self.dedupe_key(&file);
            match index.classify(&file.media, key) {
                Classification::Keeper => self.handle_keeper(
                    &file,
                    &mut planner,
                    &mut keeper_destinations,
                    &mut relocated,
                    &mut report,
                ),
                Classification::DuplicateOf(keeper) => self.handle_duplicate(
                    &file,
                    &keeper,
                    &mut duplicates_planner,
                    &keeper_destinations,
                    &mut relocated,
                    &mut report,
                ),
            }
        }

        info!("Cleaning up emptied directories");
        report.folders_removed =
            remove_empty_directories(&config.source_root, &relocated, config.dry_run);

        info!("{}", report.summary());
        Ok(report)
    }

    /// Collect candidate files in deterministic lexicographic path order.
    ///
    /// The destination subtree is skipped when it lives inside the source,
    /// so organized files are never rescanned as new input.
    fn collect_files(&self) -> Result<Vec<MediaFile>> {
        let config = &self.config;
        let mut files = Vec::new();

        let skip_destination =
            config.destination_root != config.source_root && config.destination_root.exists();

        for entry in WalkDir::new(&config.source_root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                !config.is_excluded_path(e.path())
                    && !(skip_destination && e.path() == config.destination_root)
            })
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file()
                && let Some(ext) = path.extension().and_then(|e| e.to_str())
                && config.is_candidate(ext)
            {
                match MediaFile::from_path(
                    path,
                    &config.image_extensions,
                    &config.video_extensions,
                    &config.audio_extensions,
                ) {
                    Ok(media) => files.push(media),
                    Err(e) => {
                        warn!(?path, error = %e, "Cannot stat file during scan, skipping")
                    }
                }
            }
        }

        // Lexicographic order is the canonical tie-break for keeper
        // selection; never rely on traversal order
        files.sort_by(|a, b| a.path.cmp(&b.path));

        debug!(count = files.len(), "Collected files in scan order");
        Ok(files)
    }

    fn dedupe_key(&self, file: &PreparedFile) -> DedupeKey {
        match self.config.dedupe_strategy {
            DedupeStrategy::Hash => {
                // prepare_file guarantees a fingerprint under this strategy
                DedupeKey::Hash(file.fingerprint.expect("fingerprint computed for hash strategy"))
            }
            DedupeStrategy::Filename => {
                DedupeKey::Filename(file.media.file_name().to_lowercase())
            }
            DedupeStrategy::Timestamp => DedupeKey::Timestamp(file.date.date),
        }
    }

    /// Plan and apply the move/copy for a unique file
    fn handle_keeper(
        &self,
        file: &PreparedFile,
        planner: &mut PathPlanner,
        keeper_destinations: &mut HashMap<PathBuf, PathBuf>,
        relocated: &mut HashSet<PathBuf>,
        report: &mut RunReport,
    ) {
        let config = &self.config;

        let dest = match planner.plan(&file.media, &file.date, file.camera.as_deref()) {
            Ok(dest) => dest,
            Err(e) => {
                warn!(path = ?file.media.path, error = %e, "Failed to plan destination");
                report.record(FileOutcome {
                    source: file.media.path.clone(),
                    destination: None,
                    action: FileAction::Failed,
                    date_source: Some(file.date.source),
                    reason: Some(e.to_string()),
                });
                return;
            }
        };

        if dest == file.media.path {
            debug!(path = ?file.media.path, "Already at planned destination");
            keeper_destinations.insert(file.media.path.clone(), dest.clone());
            report.record(FileOutcome {
                source: file.media.path.clone(),
                destination: Some(dest),
                action: FileAction::AlreadyOrganized,
                date_source: Some(file.date.source),
                reason: None,
            });
            return;
        }

        let action = match config.operation {
            FileOperation::Move => FileAction::Moved,
            FileOperation::Copy => FileAction::Copied,
        };

        if !config.dry_run
            && let Err(e) = apply_operation(
                &file.media.path,
                &dest,
                config.operation,
                config.preserve_timestamps,
            )
        {
            warn!(path = ?file.media.path, ?dest, error = %e, "Failed to apply operation");
            report.record(FileOutcome {
                source: file.media.path.clone(),
                destination: Some(dest),
                action: FileAction::Failed,
                date_source: Some(file.date.source),
                reason: Some(e.to_string()),
            });
            return;
        }

        if config.operation == FileOperation::Move {
            relocated.insert(file.media.path.clone());
        }
        // Only a keeper that reached its destination may serve as a link
        // target; on failure the fallback links to its surviving source
        keeper_destinations.insert(file.media.path.clone(), dest.clone());

        info!(
            source = ?file.media.path,
            destination = ?dest,
            date_source = ?file.date.source,
            dry_run = config.dry_run,
            "Organized file"
        );
        report.record(FileOutcome {
            source: file.media.path.clone(),
            destination: Some(dest),
            action,
            date_source: Some(file.date.source),
            reason: None,
        });
    }

    /// Route a duplicate through the configured duplicate action
    fn handle_duplicate(
        &self,
        file: &PreparedFile,
        keeper: &Path,
        duplicates_planner: &mut PathPlanner,
        keeper_destinations: &HashMap<PathBuf, PathBuf>,
        relocated: &mut HashSet<PathBuf>,
        report: &mut RunReport,
    ) {
        let config = &self.config;
        let source = file.media.path.clone();

        match config.dedupe_action {
            DedupeAction::Skip => {
                debug!(path = ?source, ?keeper, "Skipping duplicate");
                report.record(FileOutcome {
                    source,
                    destination: None,
                    action: FileAction::SkippedDuplicate,
                    date_source: Some(file.date.source),
                    reason: Some(format!("duplicate of {}", keeper.display())),
                });
            }
            DedupeAction::MoveToDuplicates => {
                let dest = match duplicates_planner.plan(&file.media, &file.date, None) {
                    Ok(dest) => dest,
                    Err(e) => {
                        report.record(FileOutcome {
                            source,
                            destination: None,
                            action: FileAction::Failed,
                            date_source: Some(file.date.source),
                            reason: Some(e.to_string()),
                        });
                        return;
                    }
                };
                if !config.dry_run
                    && let Err(e) =
                        apply_operation(&source, &dest, FileOperation::Move, config.preserve_timestamps)
                {
                    report.record(FileOutcome {
                        source,
                        destination: Some(dest),
                        action: FileAction::Failed,
                        date_source: Some(file.date.source),
                        reason: Some(e.to_string()),
                    });
                    return;
                }
                relocated.insert(source.clone());
                report.record(FileOutcome {
                    source,
                    destination: Some(dest),
                    action: FileAction::MovedToDuplicates,
                    date_source: Some(file.date.source),
                    reason: Some(format!("duplicate of {}", keeper.display())),
                });
            }
            DedupeAction::Link => {
                // Link to where the keeper ended up, or to the keeper itself
                // if its own move failed
                let target = keeper_destinations
                    .get(keeper)
                    .cloned()
                    .unwrap_or_else(|| keeper.to_path_buf());
                if !config.dry_run && let Err(e) = replace_with_hard_link(&source, &target) {
                    report.record(FileOutcome {
                        source,
                        destination: Some(target),
                        action: FileAction::Failed,
                        date_source: Some(file.date.source),
                        reason: Some(e.to_string()),
                    });
                    return;
                }
                report.record(FileOutcome {
                    source,
                    destination: Some(target),
                    action: FileAction::Linked,
                    date_source: Some(file.date.source),
                    reason: Some(format!("duplicate of {}", keeper.display())),
                });
            }
            DedupeAction::Remove => {
                if !config.dry_run && let Err(e) = fs::remove_file(&source) {
                    report.record(FileOutcome {
                        source,
                        destination: None,
                        action: FileAction::Failed,
                        date_source: Some(file.date.source),
                        reason: Some(format!("failed to remove duplicate: {}", e)),
                    });
                    return;
                }
                relocated.insert(source.clone());
                report.bytes_freed += file.media.size;
                info!(path = ?source, ?keeper, dry_run = config.dry_run, "Removed duplicate");
                report.record(FileOutcome {
                    source,
                    destination: None,
                    action: FileAction::Removed,
                    date_source: Some(file.date.source),
                    reason: Some(format!("duplicate of {}", keeper.display())),
                });
            }
        }
    }
}

/// Gather fingerprint, date and camera label for one file.
///
/// Runs on the worker pool; read-only.
fn prepare_file(
    media: MediaFile,
    want_fingerprint: bool,
    want_camera: bool,
) -> std::result::Result<PreparedFile, (MediaFile, Error)> {
    let fp = if want_fingerprint {
        match fingerprint(&media.path) {
            Ok(fp) => Some(fp),
            Err(e) => return Err((media, e)),
        }
    } else {
        None
    };

    let date = match date::resolve(&media) {
        Ok(date) => date,
        Err(e) => return Err((media, e)),
    };

    let camera = if want_camera && media.kind == crate::media::FileKind::Image {
        exif::camera_label(&media.path)
    } else {
        None
    };

    Ok(PreparedFile {
        media,
        fingerprint: fp,
        date,
        camera,
    })
}

/// Perform the move or copy, creating parent directories as needed.
///
/// Moves try an atomic rename first and fall back to copy-then-delete for
/// cross-volume destinations. The source mtime is captured before the
/// operation so it can be restored afterwards.
fn apply_operation(
    source: &Path,
    dest: &Path,
    operation: FileOperation,
    preserve_timestamps: bool,
) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| mutation_error("create directory for", source, dest, e))?;
    }

    let source_mtime = if preserve_timestamps {
        fs::metadata(source)
            .and_then(|m| m.modified())
            .ok()
    } else {
        None
    };

    match operation {
        FileOperation::Copy => {
            copy_file(source, dest)?;
        }
        FileOperation::Move => {
            if fs::rename(source, dest).is_err() {
                // Cross-volume move: copy, verify size, then delete source
                copy_file(source, dest)?;
                let src_len = fs::metadata(source).map(|m| m.len());
                let dst_len = fs::metadata(dest).map(|m| m.len());
                if let (Ok(src_len), Ok(dst_len)) = (src_len, dst_len)
                    && src_len != dst_len
                {
                    return Err(Error::Mutation {
                        operation: "move",
                        source_path: source.to_path_buf(),
                        dest: dest.to_path_buf(),
                        message: "size mismatch after cross-volume copy".into(),
                    });
                }
                fs::remove_file(source).map_err(|e| mutation_error("move", source, dest, e))?;
            }
        }
    }

    if let Some(mtime) = source_mtime {
        restore_mtime(dest, mtime);
    }

    Ok(())
}

/// Copy file with buffered I/O
fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    let src_file = File::open(source).map_err(|e| mutation_error("copy", source, dest, e))?;
    let dest_file = File::create(dest).map_err(|e| mutation_error("copy", source, dest, e))?;

    let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, src_file);
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, dest_file);

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| mutation_error("copy", source, dest, e))?;
        if bytes_read == 0 {
            break;
        }
        writer
            .write_all(&buffer[..bytes_read])
            .map_err(|e| mutation_error("copy", source, dest, e))?;
    }

    writer
        .flush()
        .map_err(|e| mutation_error("copy", source, dest, e))?;
    Ok(())
}

/// Replace a duplicate with a hard link to the keeper's file.
///
/// The link is staged under a temporary name and renamed over the source,
/// so a failure (a destination on another filesystem, say) leaves the
/// duplicate's bytes untouched.
fn replace_with_hard_link(source: &Path, target: &Path) -> Result<()> {
    let staged = staged_link_path(source);
    fs::hard_link(target, &staged).map_err(|e| mutation_error("link", source, target, e))?;
    if let Err(e) = fs::rename(&staged, source) {
        let _ = fs::remove_file(&staged);
        return Err(mutation_error("link", source, target, e));
    }
    Ok(())
}

fn staged_link_path(source: &Path) -> PathBuf {
    let name = source
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("duplicate");
    source.with_file_name(format!(".{}.link-tmp", name))
}

fn restore_mtime(dest: &Path, mtime: SystemTime) {
    if let Err(e) = filetime::set_file_mtime(dest, FileTime::from_system_time(mtime)) {
        warn!(?dest, error = %e, "Could not restore modification time");
    }
}

fn mutation_error(
    operation: &'static str,
    source: &Path,
    dest: &Path,
    e: std::io::Error,
) -> Error {
    Error::Mutation {
        operation,
        source_path: source.to_path_buf(),
        dest: dest.to_path_buf(),
        message: e.to_string(),
    }
}
