//! Duplicate detection index
//!
//! Files are fed to the index in deterministic scan order (lexicographic
//! full-path order). The first file seen with a given key becomes the
//! keeper; every later file with the same key is classified as a duplicate
//! of that keeper, regardless of its name or location.

use crate::hash::ContentFingerprint;
use crate::media::MediaFile;
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Which property of a file identifies duplicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DedupeStrategy {
    /// Exact content match via fingerprint (default)
    #[default]
    Hash,
    /// Case-normalized filename match
    Filename,
    /// Resolved-date match
    Timestamp,
}

/// Key under which a file is registered, per the active strategy.
///
/// Keeper-wins semantics are identical across strategies; only the key
/// differs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupeKey {
    Hash(ContentFingerprint),
    Filename(String),
    Timestamp(NaiveDate),
}

/// Classification of a file against earlier-seen files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// First file seen with this key; retained as canonical
    Keeper,
    /// Same key as an earlier file; the keeper's source path is carried
    DuplicateOf(PathBuf),
}

/// Accumulates keys and reports which files duplicate an earlier-seen one
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    keepers: HashMap<DedupeKey, PathBuf>,
}

impl DuplicateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a file, registering it as keeper if its key is new.
    ///
    /// Must be called in scan order: insertion order determines keeper
    /// selection.
    pub fn classify(&mut self, file: &MediaFile, key: DedupeKey) -> Classification {
        match self.keepers.get(&key) {
            Some(keeper) => {
                debug!(path = ?file.path, ?keeper, "Classified as duplicate");
                Classification::DuplicateOf(keeper.clone())
            }
            None => {
                self.keepers.insert(key, file.path.clone());
                Classification::Keeper
            }
        }
    }

    /// Number of distinct keys seen so far
    pub fn unique_count(&self) -> usize {
        self.keepers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::FileKind;

    fn file(path: &str) -> MediaFile {
        MediaFile {
            path: PathBuf::from(path),
            size: 0,
            kind: FileKind::Image,
            extension: "jpg".into(),
        }
    }

    fn fp(byte: u8) -> ContentFingerprint {
        ContentFingerprint::from([byte; 32])
    }

    #[test]
    fn test_first_seen_is_keeper() {
        let mut index = DuplicateIndex::new();
        let a = file("/src/a.jpg");
        let b = file("/src/b.jpg");

        assert_eq!(index.classify(&a, DedupeKey::Hash(fp(1))), Classification::Keeper);
        assert_eq!(
            index.classify(&b, DedupeKey::Hash(fp(1))),
            Classification::DuplicateOf(PathBuf::from("/src/a.jpg"))
        );
        assert_eq!(index.unique_count(), 1);
    }

    #[test]
    fn test_distinct_content_both_keepers() {
        let mut index = DuplicateIndex::new();
        let a = file("/src/a.jpg");
        let b = file("/src/b.jpg");

        assert_eq!(index.classify(&a, DedupeKey::Hash(fp(1))), Classification::Keeper);
        assert_eq!(index.classify(&b, DedupeKey::Hash(fp(2))), Classification::Keeper);
        assert_eq!(index.unique_count(), 2);
    }

    #[test]
    fn test_every_later_copy_names_the_same_keeper() {
        let mut index = DuplicateIndex::new();
        let files = ["/a/x.jpg", "/b/y.jpg", "/c/z.jpg"].map(file);

        assert_eq!(
            index.classify(&files[0], DedupeKey::Hash(fp(7))),
            Classification::Keeper
        );
        for f in &files[1..] {
            assert_eq!(
                index.classify(f, DedupeKey::Hash(fp(7))),
                Classification::DuplicateOf(PathBuf::from("/a/x.jpg"))
            );
        }
    }

    #[test]
    fn test_filename_keys_are_case_normalized() {
        let mut index = DuplicateIndex::new();
        let a = file("/one/Photo.JPG");
        let b = file("/two/photo.jpg");

        let key = |f: &MediaFile| DedupeKey::Filename(f.file_name().to_lowercase());

        assert_eq!(index.classify(&a, key(&a)), Classification::Keeper);
        assert_eq!(
            index.classify(&b, key(&b)),
            Classification::DuplicateOf(PathBuf::from("/one/Photo.JPG"))
        );
    }

    #[test]
    fn test_timestamp_keys_group_by_date() {
        let mut index = DuplicateIndex::new();
        let a = file("/src/a.jpg");
        let b = file("/src/b.jpg");
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        assert_eq!(
            index.classify(&a, DedupeKey::Timestamp(date)),
            Classification::Keeper
        );
        assert_eq!(
            index.classify(&b, DedupeKey::Timestamp(date)),
            Classification::DuplicateOf(PathBuf::from("/src/a.jpg"))
        );
    }
}
