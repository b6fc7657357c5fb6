//! Capture-time parsing from photo filenames
//!
//! Current cameras write `YYYYMMDD_HHMM_UTC.jpg`. Older uploads used
//! `YYYYMMDD_HHMM.jpg` with no zone marker; those are read as the same
//! naive clock reading, i.e. treated as UTC as well.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::FilenameError;

const CAPTURE_FORMAT: &str = "%Y%m%d_%H%M_UTC";
const LEGACY_CAPTURE_FORMAT: &str = "%Y%m%d_%H%M";

pub(crate) fn parse_capture_time(path: &Path) -> Result<DateTime<Utc>, FilenameError> {
    let basename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| FilenameError {
            basename: basename.clone(),
        })?;

    let format = match capture_shape(stem) {
        Some(true) => CAPTURE_FORMAT,
        Some(false) => LEGACY_CAPTURE_FORMAT,
        None => return Err(FilenameError { basename }),
    };

    NaiveDateTime::parse_from_str(stem, format)
        .map(|naive| naive.and_utc())
        .map_err(|_| FilenameError { basename })
}

/// `Some(true)` for `DDDDDDDD_DDDD_UTC`, `Some(false)` for `DDDDDDDD_DDDD`.
/// chrono alone accepts single-digit fields and leading spaces.
fn capture_shape(stem: &str) -> Option<bool> {
    let bytes = stem.as_bytes();
    let has_suffix = match bytes.len() {
        13 => false,
        17 if bytes.ends_with(b"_UTC") => true,
        _ => return None,
    };
    let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
    (digits(0..8) && bytes[8] == b'_' && digits(9..13)).then_some(has_suffix)
}
