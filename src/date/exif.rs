//! EXIF metadata extraction for images
//!
//! Only the timestamp tags and the camera model are read. Any failure here
//! (no EXIF segment, malformed tag, unreadable file) is reported as a miss
//! so the resolver can fall through to the next strategy.

use chrono::{NaiveDate, NaiveDateTime};
use exif::{In, Reader, Tag};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::trace;

/// EXIF tags to try for date extraction, in priority order
const DATE_TAGS: &[Tag] = &[
    Tag::DateTimeOriginal,
    Tag::DateTimeDigitized,
    Tag::DateTime,
];

/// Extract the capture date from EXIF metadata, if present and parseable
pub fn extract_exif_date(path: &Path) -> Option<NaiveDate> {
    let exif = read_exif(path)?;

    for tag in DATE_TAGS {
        if let Some(field) = exif.get_field(*tag, In::PRIMARY)
            && let Some(datetime) = parse_exif_datetime(&field.display_value().to_string())
        {
            trace!(?path, ?tag, "Found EXIF date");
            return Some(datetime.date());
        }
    }

    None
}

/// Extract the camera model label from EXIF metadata, if present
///
/// Used by the path planner's `{camera}` placeholder.
pub fn camera_label(path: &Path) -> Option<String> {
    let exif = read_exif(path)?;
    let field = exif.get_field(Tag::Model, In::PRIMARY)?;
    let label = field
        .display_value()
        .to_string()
        .trim()
        .trim_matches('"')
        .to_string();
    if label.is_empty() { None } else { Some(label) }
}

fn read_exif(path: &Path) -> Option<exif::Exif> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    Reader::new().read_from_container(&mut reader).ok()
}

/// Parse EXIF datetime string format: "YYYY:MM:DD HH:MM:SS"
fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_matches('"');

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S") {
        return Some(dt);
    }

    // Subseconds and a few non-standard writers
    let formats = [
        "%Y:%m:%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
    ];

    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    None
}
