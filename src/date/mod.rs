//! Date resolution for media files
//!
//! Derives a best-effort calendar date for each file from, in priority order:
//! 1. Embedded EXIF metadata (for images)
//! 2. Date patterns in the filename
//! 3. Filesystem modification time
//!
//! Resolution never returns "no date" for an accessible file; only a file
//! whose filesystem metadata cannot be read fails, and that failure is
//! surfaced to the pipeline as a per-file error.

pub mod exif;
pub mod filename;

use crate::error::{Error, Result};
use crate::media::{FileKind, MediaFile};
use chrono::{Datelike, NaiveDate};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Provenance of a resolved date
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateSource {
    /// Read from embedded capture-time metadata
    Metadata,
    /// Parsed from a date substring in the filename
    FilenamePattern,
    /// Filesystem modification time fallback
    MtimeFallback,
}

/// A calendar date plus the strategy that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDate {
    pub date: NaiveDate,
    pub source: DateSource,
}

impl ResolvedDate {
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

/// Resolve the date for a media file
///
/// Pure with respect to file content: reads only, never mutates timestamps.
/// A malformed or absent metadata tag is a miss, not an error; the next
/// strategy is tried.
pub fn resolve(file: &MediaFile) -> Result<ResolvedDate> {
    if file.kind == FileKind::Image {
        if let Some(date) = exif::extract_exif_date(&file.path) {
            debug!(path = ?file.path, %date, "Resolved date from EXIF metadata");
            return Ok(ResolvedDate {
                date,
                source: DateSource::Metadata,
            });
        }
    }

    if let Some(date) = filename::parse_filename_date(file.file_name()) {
        debug!(path = ?file.path, %date, "Resolved date from filename pattern");
        return Ok(ResolvedDate {
            date,
            source: DateSource::FilenamePattern,
        });
    }

    let date = mtime_date(&file.path)?;
    debug!(path = ?file.path, %date, "Resolved date from modification time");
    Ok(ResolvedDate {
        date,
        source: DateSource::MtimeFallback,
    })
}

/// Calendar date of the file's last modification time
fn mtime_date(path: &Path) -> Result<NaiveDate> {
    let metadata = fs::metadata(path).map_err(|e| Error::FileAccess {
        path: path.to_path_buf(),
        message: format!("Cannot read filesystem metadata: {}", e),
    })?;
    let modified = metadata.modified().map_err(|e| Error::FileAccess {
        path: path.to_path_buf(),
        message: format!("Cannot read modification time: {}", e),
    })?;
    let datetime: chrono::DateTime<chrono::Utc> = modified.into();
    Ok(datetime.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn media_file(dir: &TempDir, name: &str, content: &[u8]) -> MediaFile {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content).unwrap();
        MediaFile::from_path(
            &path,
            &["jpg".into(), "png".into(), "tif".into()],
            &["mp4".into()],
            &[],
        )
        .unwrap()
    }

    // Minimal little-endian TIFF whose IFD0 carries a DateTime tag
    fn tiff_with_datetime(datetime: &str) -> Vec<u8> {
        assert_eq!(datetime.len(), 19);
        let mut bytes = vec![0x49, 0x49, 0x2a, 0x00, 0x08, 0x00, 0x00, 0x00];
        bytes.extend_from_slice(&1u16.to_le_bytes()); // one IFD entry
        bytes.extend_from_slice(&306u16.to_le_bytes()); // DateTime
        bytes.extend_from_slice(&2u16.to_le_bytes()); // ASCII
        bytes.extend_from_slice(&20u32.to_le_bytes()); // length incl NUL
        bytes.extend_from_slice(&26u32.to_le_bytes()); // value offset
        bytes.extend_from_slice(&0u32.to_le_bytes()); // no next IFD
        bytes.extend_from_slice(datetime.as_bytes());
        bytes.push(0);
        bytes
    }

    #[test]
    fn test_metadata_beats_filename_date() {
        let dir = TempDir::new().unwrap();
        // Filename says 2020-05-05; the embedded tag must win
        let file = media_file(
            &dir,
            "scan_2020_05_05.tif",
            &tiff_with_datetime("2024:01:15 10:20:30"),
        );

        let resolved = resolve(&file).unwrap();
        assert_eq!(resolved.source, DateSource::Metadata);
        assert_eq!(resolved.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_filename_beats_mtime() {
        let dir = TempDir::new().unwrap();
        let file = media_file(&dir, "IMG_20240315.jpg", b"not a real jpeg");

        // No parseable EXIF in the content, so the filename pattern wins
        let resolved = resolve(&file).unwrap();
        assert_eq!(resolved.source, DateSource::FilenamePattern);
        assert_eq!(resolved.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn test_mtime_fallback_always_resolves() {
        let dir = TempDir::new().unwrap();
        let file = media_file(&dir, "holiday.jpg", b"no exif, no date in name");

        let resolved = resolve(&file).unwrap();
        assert_eq!(resolved.source, DateSource::MtimeFallback);
        // Freshly created file resolves to today (UTC)
        assert_eq!(resolved.date, chrono::Utc::now().date_naive());
    }

    #[test]
    fn test_non_image_skips_metadata_lookup() {
        let dir = TempDir::new().unwrap();
        let file = media_file(&dir, "VID_20230101.mp4", b"video bytes");

        let resolved = resolve(&file).unwrap();
        assert_eq!(resolved.source, DateSource::FilenamePattern);
        assert_eq!(resolved.year(), 2023);
        assert_eq!(resolved.month(), 1);
        assert_eq!(resolved.day(), 1);
    }
}
