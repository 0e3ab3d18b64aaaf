//! Filename date parsing
//!
//! An ordered table of independent matchers, each a pure function from the
//! filename stem to an optional calendar date. Matchers are tried in fixed
//! priority order until one yields a calendar-valid date; a numeric substring
//! that parses to an invalid date (month 13, day 31 in February) is rejected
//! and the next matcher is tried.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Accepted year range for parsed dates
const YEAR_MIN: i32 = 1900;
const YEAR_MAX: i32 = 2100;

static PATTERN_YMD_DASH: OnceLock<Regex> = OnceLock::new();
static PATTERN_YMD_UNDERSCORE: OnceLock<Regex> = OnceLock::new();
static PATTERN_YMD_COMPACT: OnceLock<Regex> = OnceLock::new();
static PATTERN_DMY_DASH: OnceLock<Regex> = OnceLock::new();
static PATTERN_DMY_UNDERSCORE: OnceLock<Regex> = OnceLock::new();
static PATTERN_PREFIXED: OnceLock<Regex> = OnceLock::new();

/// Matchers in priority order; first calendar-valid hit wins
const MATCHERS: &[fn(&str) -> Option<NaiveDate>] = &[
    match_ymd_dash,
    match_ymd_underscore,
    match_ymd_compact,
    match_dmy_dash,
    match_dmy_underscore,
    match_prefixed,
];

/// Parse a calendar date from a filename
pub fn parse_filename_date(filename: &str) -> Option<NaiveDate> {
    // Strip the extension so trailing digits in it can't match
    let stem = filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(filename);

    MATCHERS.iter().find_map(|matcher| matcher(stem))
}

/// YYYY-MM-DD
fn match_ymd_dash(s: &str) -> Option<NaiveDate> {
    let re = PATTERN_YMD_DASH
        .get_or_init(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap());
    let caps = re.captures(s)?;
    build_date_ymd(&caps[1], &caps[2], &caps[3])
}

/// YYYY_MM_DD
fn match_ymd_underscore(s: &str) -> Option<NaiveDate> {
    let re = PATTERN_YMD_UNDERSCORE
        .get_or_init(|| Regex::new(r"(\d{4})_(\d{2})_(\d{2})").unwrap());
    let caps = re.captures(s)?;
    build_date_ymd(&caps[1], &caps[2], &caps[3])
}

/// YYYYMMDD
fn match_ymd_compact(s: &str) -> Option<NaiveDate> {
    let re = PATTERN_YMD_COMPACT
        .get_or_init(|| Regex::new(r"(\d{4})(\d{2})(\d{2})").unwrap());
    let caps = re.captures(s)?;
    build_date_ymd(&caps[1], &caps[2], &caps[3])
}

/// DD-MM-YYYY
fn match_dmy_dash(s: &str) -> Option<NaiveDate> {
    let re = PATTERN_DMY_DASH
        .get_or_init(|| Regex::new(r"(\d{2})-(\d{2})-(\d{4})").unwrap());
    let caps = re.captures(s)?;
    build_date_ymd(&caps[3], &caps[2], &caps[1])
}

/// DD_MM_YYYY
fn match_dmy_underscore(s: &str) -> Option<NaiveDate> {
    let re = PATTERN_DMY_UNDERSCORE
        .get_or_init(|| Regex::new(r"(\d{2})_(\d{2})_(\d{4})").unwrap());
    let caps = re.captures(s)?;
    build_date_ymd(&caps[3], &caps[2], &caps[1])
}

/// IMG_YYYYMMDD / VID_YYYYMMDD (common camera naming)
fn match_prefixed(s: &str) -> Option<NaiveDate> {
    let re = PATTERN_PREFIXED
        .get_or_init(|| Regex::new(r"(?:IMG|VID)[-_](\d{4})(\d{2})(\d{2})").unwrap());
    let caps = re.captures(s)?;
    build_date_ymd(&caps[1], &caps[2], &caps[3])
}

/// Validate and build a date from string components
fn build_date_ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;

    if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
        return None;
    }

    // from_ymd_opt rejects month 0/13 and day overflow for the month/year
    NaiveDate::from_ymd_opt(year, month, day)
}
