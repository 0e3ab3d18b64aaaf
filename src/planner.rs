//! Destination path planning
//!
//! Expands a naming pattern into a destination path relative to the
//! destination root and guarantees the result collides neither with
//! existing files on disk nor with any path already planned earlier in the
//! same run. The reserved set is what makes dry-run output trustworthy:
//! the simulation and the real run share this exact logic.

use crate::date::ResolvedDate;
use crate::error::{Error, Result};
use crate::media::MediaFile;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Upper bound on numeric disambiguation attempts per file
const MAX_CONFLICT_ATTEMPTS: u32 = 10000;

/// Plans unique destination paths for one run
pub struct PathPlanner {
    destination_root: PathBuf,
    pattern: String,
    /// Paths allocated earlier in this run, absolute
    reserved: HashSet<PathBuf>,
    /// Zero-padded sequence counter for the `{seq}` placeholder
    seq: u32,
}

impl PathPlanner {
    pub fn new(destination_root: &Path, pattern: &str) -> Self {
        Self {
            destination_root: destination_root.to_path_buf(),
            pattern: pattern.to_string(),
            reserved: HashSet::new(),
            seq: 0,
        }
    }

    /// Compute a unique destination path for a file.
    ///
    /// The winning path is reserved before returning, so no two files
    /// planned in the same run can ever collide, and existing destination
    /// content is never silently overwritten.
    pub fn plan(
        &mut self,
        file: &MediaFile,
        date: &ResolvedDate,
        camera: Option<&str>,
    ) -> Result<PathBuf> {
        self.seq += 1;
        let relative = self.expand_pattern(file, date, camera);
        let candidate = self.destination_root.join(&relative);

        // A file already sitting at its own target is not a conflict;
        // re-runs must not push it to a disambiguated name
        if candidate == file.path {
            self.reserved.insert(candidate.clone());
            return Ok(candidate);
        }

        if self.is_free(&candidate) {
            self.reserved.insert(candidate.clone());
            trace!(path = ?candidate, "Planned destination");
            return Ok(candidate);
        }

        // Collision: append _1, _2, ... to the filename stem
        let stem = candidate
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let extension = candidate
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        let parent = candidate
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default();

        for i in 1..=MAX_CONFLICT_ATTEMPTS {
            let disambiguated = parent.join(format!("{}_{}{}", stem, i, extension));
            if self.is_free(&disambiguated) {
                self.reserved.insert(disambiguated.clone());
                trace!(path = ?disambiguated, attempt = i, "Planned destination with disambiguator");
                return Ok(disambiguated);
            }
        }

        Err(Error::PathConflictExhausted {
            path: file.path.clone(),
            attempts: MAX_CONFLICT_ATTEMPTS,
        })
    }

    /// Free means neither reserved in this run nor present on disk
    fn is_free(&self, path: &Path) -> bool {
        !self.reserved.contains(path) && !path.exists()
    }

    /// Expand pattern placeholders into a relative path
    fn expand_pattern(&self, file: &MediaFile, date: &ResolvedDate, camera: Option<&str>) -> PathBuf {
        let expanded = self
            .pattern
            .replace("{YYYY}", &format!("{:04}", date.year()))
            .replace("{MM}", &format!("{:02}", date.month()))
            .replace("{DD}", &format!("{:02}", date.day()))
            .replace("{filename}", file.file_name())
            .replace("{stem}", file.file_stem())
            .replace("{ext}", &file.extension)
            .replace("{camera}", camera.unwrap_or("unknown"))
            .replace("{seq}", &format!("{:04}", self.seq));

        // Split on '/' so patterns stay portable across platforms
        expanded.split('/').filter(|c| !c.is_empty()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::DateSource;
    use crate::media::FileKind;
    use tempfile::TempDir;

    fn file(path: &str) -> MediaFile {
        let path = PathBuf::from(path);
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        MediaFile {
            path,
            size: 0,
            kind: FileKind::Image,
            extension,
        }
    }

    fn resolved(y: i32, m: u32, d: u32) -> ResolvedDate {
        ResolvedDate {
            date: chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            source: DateSource::FilenamePattern,
        }
    }

    #[test]
    fn test_pattern_expansion() {
        let dir = TempDir::new().unwrap();
        let mut planner = PathPlanner::new(dir.path(), "{YYYY}/{MM}/{filename}");

        let dest = planner
            .plan(&file("/src/IMG_20240315.jpg"), &resolved(2024, 3, 15), None)
            .unwrap();
        assert_eq!(dest, dir.path().join("2024/03/IMG_20240315.jpg"));
    }

    #[test]
    fn test_camera_and_seq_placeholders() {
        let dir = TempDir::new().unwrap();
        let mut planner = PathPlanner::new(dir.path(), "{camera}/{YYYY}/{stem}_{seq}.{ext}");

        let dest = planner
            .plan(&file("/src/photo.jpg"), &resolved(2024, 3, 15), Some("PixelCam"))
            .unwrap();
        assert_eq!(dest, dir.path().join("PixelCam/2024/photo_0001.jpg"));

        let dest = planner
            .plan(&file("/src/photo2.jpg"), &resolved(2024, 3, 15), None)
            .unwrap();
        assert_eq!(dest, dir.path().join("unknown/2024/photo2_0002.jpg"));
    }

    #[test]
    fn test_reserved_paths_never_collide() {
        let dir = TempDir::new().unwrap();
        let mut planner = PathPlanner::new(dir.path(), "{YYYY}/{MM}/{filename}");
        let date = resolved(2024, 3, 15);

        // N files resolving to the same target produce N distinct paths
        let a = planner.plan(&file("/one/photo.jpg"), &date, None).unwrap();
        let b = planner.plan(&file("/two/photo.jpg"), &date, None).unwrap();
        let c = planner.plan(&file("/three/photo.jpg"), &date, None).unwrap();

        assert_eq!(a, dir.path().join("2024/03/photo.jpg"));
        assert_eq!(b, dir.path().join("2024/03/photo_1.jpg"));
        assert_eq!(c, dir.path().join("2024/03/photo_2.jpg"));
    }

    #[test]
    fn test_existing_destination_file_forces_suffix() {
        let dir = TempDir::new().unwrap();
        let occupied = dir.path().join("2024/03");
        std::fs::create_dir_all(&occupied).unwrap();
        std::fs::write(occupied.join("photo.jpg"), b"already here").unwrap();

        let mut planner = PathPlanner::new(dir.path(), "{YYYY}/{MM}/{filename}");
        let dest = planner
            .plan(&file("/src/photo.jpg"), &resolved(2024, 3, 15), None)
            .unwrap();
        assert_eq!(dest, occupied.join("photo_1.jpg"));
    }
}
