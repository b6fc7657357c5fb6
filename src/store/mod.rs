//! Diary storage
//!
//! The ingestion pipeline only needs the four operations of [`EntryStore`];
//! browsing queries live on the concrete [`SqliteStore`].

mod sqlite;

use chrono::{DateTime, Utc};

use crate::core::DiaryEntry;
use crate::error::StoreError;

pub(crate) use sqlite::SqliteStore;

pub(crate) trait EntryStore: Send + Sync {
    /// Record a new entry and return its id. A path that is already
    /// recorded fails with [`StoreError::DuplicatePath`].
    fn create(
        &self,
        image_path: &str,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    fn is_processed(&self, image_path: &str) -> Result<bool, StoreError>;

    /// Capture time of the newest entry, `None` for an empty diary.
    fn latest_created_at(&self) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Entries with `start <= created_at < end`, oldest first.
    fn entries_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DiaryEntry>, StoreError>;
}
