//! Media file model
//!
//! A `MediaFile` captures everything the pipeline needs to know about a
//! source file at scan time: its path, size and extension-derived kind.
//! Instances are immutable for the duration of one run.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Detected file kind, derived from the lowercased extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Video,
    Audio,
    Other,
}

/// A media file discovered during the scan phase
#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Absolute source path (identity)
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Detected kind
    pub kind: FileKind,
    /// Lowercased extension without the leading dot, empty if none
    pub extension: String,
}

impl MediaFile {
    /// Build a `MediaFile` from a path, reading its size from the filesystem.
    ///
    /// `kind` is classified with the given extension tables.
    pub fn from_path(
        path: &Path,
        image_exts: &[String],
        video_exts: &[String],
        audio_exts: &[String],
    ) -> Result<Self> {
        let metadata = fs::metadata(path).map_err(|e| Error::FileAccess {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let kind = classify_extension(&extension, image_exts, video_exts, audio_exts);

        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            kind,
            extension,
        })
    }

    /// Original filename including extension
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Filename without the extension
    pub fn file_stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }
}

/// Classify a lowercased extension against the configured tables
pub fn classify_extension(
    ext: &str,
    image_exts: &[String],
    video_exts: &[String],
    audio_exts: &[String],
) -> FileKind {
    if image_exts.iter().any(|e| e == ext) {
        FileKind::Image
    } else if video_exts.iter().any(|e| e == ext) {
        FileKind::Video
    } else if audio_exts.iter().any(|e| e == ext) {
        FileKind::Audio
    } else {
        FileKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn tables() -> (Vec<String>, Vec<String>, Vec<String>) {
        (
            vec!["jpg".into(), "png".into(), "heic".into()],
            vec!["mp4".into(), "mov".into()],
            vec!["mp3".into(), "flac".into()],
        )
    }

    #[test]
    fn test_classify_extension() {
        let (img, vid, aud) = tables();
        assert_eq!(classify_extension("jpg", &img, &vid, &aud), FileKind::Image);
        assert_eq!(classify_extension("mov", &img, &vid, &aud), FileKind::Video);
        assert_eq!(classify_extension("mp3", &img, &vid, &aud), FileKind::Audio);
        assert_eq!(classify_extension("txt", &img, &vid, &aud), FileKind::Other);
        assert_eq!(classify_extension("", &img, &vid, &aud), FileKind::Other);
    }

    #[test]
    fn test_from_path_reads_size_and_extension() {
        let mut file = NamedTempFile::with_suffix(".JPG").unwrap();
        file.write_all(b"abcdef").unwrap();
        file.flush().unwrap();

        let (img, vid, aud) = tables();
        let media = MediaFile::from_path(file.path(), &img, &vid, &aud).unwrap();
        assert_eq!(media.size, 6);
        assert_eq!(media.extension, "jpg");
        assert_eq!(media.kind, FileKind::Image);
    }

    #[test]
    fn test_from_path_missing_file() {
        let (img, vid, aud) = tables();
        let err = MediaFile::from_path(Path::new("/nonexistent/file.jpg"), &img, &vid, &aud);
        assert!(matches!(err, Err(Error::FileAccess { .. })));
    }
}
