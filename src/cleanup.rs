//! Post-run cleanup of emptied source directories
//!
//! Walks the source tree bottom-up and removes directories that are empty
//! or contain only operating-system placeholder files once their real
//! content has been relocated. Under dry-run the same computation runs
//! against the set of paths the run would have relocated, without touching
//! the filesystem, so the simulated count equals what a real run removes.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Files that never count as directory content
const OS_NOISE_FILES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// Remove (or, under dry-run, count) directories left empty below `root`.
///
/// `relocated` holds source paths this run moved away (or would move, under
/// dry-run); they are discounted when judging emptiness. The root itself is
/// never removed. Per-directory failures are logged and skipped, never
/// propagated.
pub fn remove_empty_directories(
    root: &Path,
    relocated: &HashSet<PathBuf>,
    dry_run: bool,
) -> usize {
    let (_, removed) = sweep(root, root, relocated, dry_run);
    removed
}

/// Returns (directory is gone or would be, directories removed in subtree)
fn sweep(
    dir: &Path,
    root: &Path,
    relocated: &HashSet<PathBuf>,
    dry_run: bool,
) -> (bool, usize) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(?dir, error = %e, "Cannot read directory during cleanup");
            return (false, 0);
        }
    };

    let mut removed = 0;
    let mut blocked = false;
    let mut noise_files: Vec<PathBuf> = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(?dir, error = %e, "Cannot read directory entry during cleanup");
                blocked = true;
                continue;
            }
        };
        let path = entry.path();

        // Never follow symlinks; a linked directory counts as content
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                warn!(?path, error = %e, "Cannot read file type during cleanup");
                blocked = true;
                continue;
            }
        };

        if file_type.is_dir() {
            let (gone, n) = sweep(&path, root, relocated, dry_run);
            removed += n;
            if !gone {
                blocked = true;
            }
        } else if is_noise_file(&path) {
            noise_files.push(path);
        } else if !relocated.contains(&path) {
            blocked = true;
        }
    }

    if blocked || dir == root {
        return (false, removed);
    }

    if dry_run {
        debug!(?dir, "Would remove empty directory");
        return (true, removed + 1);
    }

    for noise in &noise_files {
        if let Err(e) = fs::remove_file(noise) {
            warn!(path = ?noise, error = %e, "Cannot remove placeholder file");
            return (false, removed);
        }
    }
    match fs::remove_dir(dir) {
        Ok(()) => {
            debug!(?dir, "Removed empty directory");
            (true, removed + 1)
        }
        Err(e) => {
            warn!(?dir, error = %e, "Cannot remove directory");
            (false, removed)
        }
    }
}

fn is_noise_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| OS_NOISE_FILES.contains(&name))
}
