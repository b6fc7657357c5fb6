//! Diary data model
//!
//! `created_at` is always the capture time parsed from the photo's
//! filename, never the time the entry was written.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A stored diary entry. `image_path` is unique across the diary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct DiaryEntry {
    pub(crate) id: i64,
    pub(crate) image_path: String,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
}

/// A calendar month that has at least one entry, in the presentation timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub(crate) struct YearMonth {
    pub(crate) year: i32,
    pub(crate) month: u32,
}

/// An image selected for generation during one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WorkItem {
    pub(crate) image_path: PathBuf,
    pub(crate) captured_at: DateTime<Utc>,
}

impl WorkItem {
    /// The dedup key stored alongside the entry.
    pub(crate) fn key(&self) -> String {
        self.image_path.to_string_lossy().into_owned()
    }
}

/// Counters for one ingestion pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct PassSummary {
    /// `*.jpg` files found in the photos directory
    pub(crate) candidates: usize,
    /// Images that survived dedup and watermark filtering
    pub(crate) queued: usize,
    pub(crate) created: usize,
    pub(crate) failed: usize,
}
