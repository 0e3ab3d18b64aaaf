//! Configuration types for the media organizer

use crate::dedupe::DedupeStrategy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What to do with files classified as duplicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DedupeAction {
    /// Leave duplicates in place, untouched
    #[default]
    Skip,
    /// Relocate duplicates into a Duplicates folder under the destination
    MoveToDuplicates,
    /// Replace duplicates with hard links to the keeper's destination
    Link,
    /// Delete duplicates from the source tree
    Remove,
}

/// File operation mode for unique files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileOperation {
    /// Move files to destination
    #[default]
    Move,
    /// Copy files to destination
    Copy,
}

/// Resolved configuration for one pipeline run
///
/// The pipeline never blocks on user input; interactive resolution is the
/// caller's job and ends here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory to scan for media files
    pub source_root: PathBuf,

    /// Root directory for organized files
    pub destination_root: PathBuf,

    /// Naming pattern with placeholders:
    /// {YYYY} {MM} {DD} {filename} {stem} {ext} {camera} {seq}
    pub naming_pattern: String,

    /// Which property identifies duplicates
    pub dedupe_strategy: DedupeStrategy,

    /// What to do with duplicates
    pub dedupe_action: DedupeAction,

    /// Move or copy unique files
    pub operation: FileOperation,

    /// Dry run mode - compute and report without touching the filesystem
    pub dry_run: bool,

    /// Only scan these extensions (lowercased, no dot); empty = all media kinds
    #[serde(default)]
    pub include_extensions: Vec<String>,

    /// Never scan these extensions
    #[serde(default)]
    pub exclude_extensions: Vec<String>,

    /// Path prefixes to exclude from scanning
    #[serde(default)]
    pub exclude_paths: Vec<PathBuf>,

    /// Number of threads for parallel hashing and date resolution (0 = auto)
    pub threads: usize,

    /// Restore the source mtime on moved/copied files
    pub preserve_timestamps: bool,

    /// Recognized image extensions
    pub image_extensions: Vec<String>,

    /// Recognized video extensions
    pub video_extensions: Vec<String>,

    /// Recognized audio extensions
    pub audio_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: PathBuf::new(),
            destination_root: PathBuf::from("organized"),
            naming_pattern: "{YYYY}/{MM}/{filename}".into(),
            dedupe_strategy: DedupeStrategy::default(),
            dedupe_action: DedupeAction::default(),
            operation: FileOperation::default(),
            dry_run: false,
            include_extensions: vec![],
            exclude_extensions: vec![],
            exclude_paths: vec![],
            threads: 0, // Auto-detect
            preserve_timestamps: true,
            image_extensions: vec![
                "jpg".into(), "jpeg".into(), "png".into(), "gif".into(),
                "bmp".into(), "webp".into(), "heic".into(), "heif".into(),
                "tiff".into(), "tif".into(),
            ],
            video_extensions: vec![
                "mp4".into(), "mov".into(), "avi".into(), "mkv".into(),
                "wmv".into(), "flv".into(), "webm".into(), "m4v".into(),
                "3gp".into(),
            ],
            audio_extensions: vec![
                "mp3".into(), "flac".into(), "wav".into(), "m4a".into(),
                "ogg".into(), "aac".into(),
            ],
        }
    }
}

impl Config {
    /// Check whether a lowercased extension should be scanned
    pub fn is_candidate(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        if self.exclude_extensions.iter().any(|e| e == &ext) {
            return false;
        }
        if !self.include_extensions.is_empty() {
            return self.include_extensions.iter().any(|e| e == &ext);
        }
        self.image_extensions.iter().any(|e| e == &ext)
            || self.video_extensions.iter().any(|e| e == &ext)
            || self.audio_extensions.iter().any(|e| e == &ext)
    }

    /// Check whether a path falls under an excluded prefix
    pub fn is_excluded_path(&self, path: &Path) -> bool {
        self.exclude_paths.iter().any(|prefix| path.starts_with(prefix))
    }

    /// Folder that receives duplicates under the move-to-duplicates action
    pub fn duplicates_dir(&self) -> PathBuf {
        self.destination_root.join("Duplicates")
    }

    /// Validate the configuration before any file processing begins.
    ///
    /// This is the only run-level failure the pipeline recognizes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.source_root.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "Source root does not exist or is not a directory: {}",
                self.source_root.display()
            )));
        }
        let has_name_placeholder = ["{filename}", "{stem}", "{seq}"]
            .iter()
            .any(|p| self.naming_pattern.contains(p));
        if !has_name_placeholder {
            return Err(ConfigError::Invalid(
                "Naming pattern must contain {filename}, {stem} or {seq}".into(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError { source: e })?;

        fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Media Organizer Configuration File
# This file uses TOML format (https://toml.io)

# Root directory to scan for media files
source_root = "/data/incoming"

# Root directory for organized files
destination_root = "/data/library"

# Naming pattern for destination paths
# Placeholders: {YYYY} {MM} {DD} {filename} {stem} {ext} {camera} {seq}
naming_pattern = "{YYYY}/{MM}/{filename}"

# Duplicate identification: "hash" (content), "filename", or "timestamp"
dedupe_strategy = "hash"

# What to do with duplicates: "skip", "move-to-duplicates", "link", "remove"
dedupe_action = "skip"

# Operation for unique files: "move" or "copy"
operation = "move"

# Dry run mode - show what would be done without doing it
dry_run = false

# Restrict the scan to these extensions (empty = all recognized media)
include_extensions = []

# Never scan these extensions
exclude_extensions = []

# Path prefixes to skip entirely
exclude_paths = []

# Number of worker threads (0 = auto-detect)
threads = 0

# Restore the source modification time on moved/copied files
preserve_timestamps = true

# Recognized media extensions (customize as needed)
image_extensions = ["jpg", "jpeg", "png", "gif", "bmp", "webp", "heic", "heif", "tiff", "tif"]
video_extensions = ["mp4", "mov", "avi", "mkv", "wmv", "flv", "webm", "m4v", "3gp"]
audio_extensions = ["mp3", "flac", "wav", "m4a", "ogg", "aac"]
"#
        .to_string()
    }
}

/// Errors that can occur when loading, saving or validating configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to serialize configuration
    SerializeError { source: toml::ser::Error },
    /// Configuration is not usable for a run
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
            ConfigError::SerializeError { source } => {
                write!(f, "Failed to serialize config: {}", source)
            }
            ConfigError::Invalid(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
            ConfigError::SerializeError { source } => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}
