//! SQLite-backed diary store

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};

use crate::core::{DiaryEntry, YearMonth};
use crate::error::StoreError;
use crate::utils::Timezone;

use super::EntryStore;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS diary (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    image_path TEXT NOT NULL UNIQUE,
    content TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_diary_created_at ON diary(created_at DESC);
"#;

const SELECT_COLUMNS: &str = "SELECT id, image_path, content, created_at FROM diary";

/// Single connection guarded by a mutex; SQLite serialises writers anyway.
pub(crate) struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub(crate) fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(StoreError::CreateDir)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn query_entries<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<DiaryEntry>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, map_row)?;
        let mut entries = Vec::new();
        for row in rows {
            let (id, image_path, content, created_at) = row?;
            entries.push(DiaryEntry {
                id,
                image_path,
                content,
                created_at: from_unix(created_at)?,
            });
        }
        Ok(entries)
    }

    /// All entries, newest first.
    pub(crate) fn all_entries(&self) -> Result<Vec<DiaryEntry>, StoreError> {
        self.query_entries(
            &format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC"),
            [],
        )
    }

    pub(crate) fn entry_by_id(&self, id: i64) -> Result<Option<DiaryEntry>, StoreError> {
        let row = self
            .conn()
            .query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), [id], map_row)
            .optional()?;
        row.map(|(id, image_path, content, created_at)| {
            Ok(DiaryEntry {
                id,
                image_path,
                content,
                created_at: from_unix(created_at)?,
            })
        })
        .transpose()
    }

    /// Entries whose content contains `keyword`, newest first.
    pub(crate) fn search(&self, keyword: &str) -> Result<Vec<DiaryEntry>, StoreError> {
        self.query_entries(
            &format!(
                "{SELECT_COLUMNS} WHERE instr(content, ?1) > 0 ORDER BY created_at DESC, id DESC"
            ),
            [keyword],
        )
    }

    /// Months with at least one entry in `timezone`, newest first.
    pub(crate) fn year_months(&self, timezone: Timezone) -> Result<Vec<YearMonth>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT created_at FROM diary")?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;

        let mut months = BTreeSet::new();
        for secs in rows {
            let (year, month) = timezone.year_month(from_unix(secs?)?);
            months.insert(YearMonth { year, month });
        }
        Ok(months.into_iter().rev().collect())
    }
}

impl EntryStore for SqliteStore {
    fn create(
        &self,
        image_path: &str,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let conn = self.conn();
        let result = conn.execute(
            "INSERT INTO diary (image_path, content, created_at) VALUES (?1, ?2, ?3)",
            params![image_path, content, created_at.timestamp()],
        );
        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicatePath {
                    image_path: image_path.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn is_processed(&self, image_path: &str) -> Result<bool, StoreError> {
        let exists = self.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM diary WHERE image_path = ?1)",
            [image_path],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(exists)
    }

    fn latest_created_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let latest = self
            .conn()
            .query_row("SELECT MAX(created_at) FROM diary", [], |row| {
                row.get::<_, Option<i64>>(0)
            })?;
        latest.map(from_unix).transpose()
    }

    fn entries_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DiaryEntry>, StoreError> {
        self.query_entries(
            &format!(
                "{SELECT_COLUMNS} WHERE created_at >= ?1 AND created_at < ?2 ORDER BY created_at ASC, id ASC"
            ),
            params![start.timestamp(), end.timestamp()],
        )
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<(i64, String, String, i64)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn from_unix(secs: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp(secs, 0).ok_or(StoreError::InvalidTimestamp { value: secs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn create_marks_path_processed() {
        let store = store();
        assert!(!store.is_processed("/photos/a.jpg").unwrap());

        let id = store.create("/photos/a.jpg", "テスト日記", utc(2026, 2, 15, 9)).unwrap();

        assert!(id > 0);
        assert!(store.is_processed("/photos/a.jpg").unwrap());
        assert!(!store.is_processed("/photos/b.jpg").unwrap());
    }

    #[test]
    fn duplicate_path_is_rejected() {
        let store = store();
        store.create("/photos/a.jpg", "first", utc(2026, 2, 15, 9)).unwrap();

        let err = store
            .create("/photos/a.jpg", "second", utc(2026, 2, 16, 9))
            .unwrap_err();

        assert!(matches!(err, StoreError::DuplicatePath { ref image_path } if image_path == "/photos/a.jpg"));
        assert_eq!(store.all_entries().unwrap().len(), 1);
    }

    #[test]
    fn latest_created_at_empty_and_max() {
        let store = store();
        assert_eq!(store.latest_created_at().unwrap(), None);

        store.create("/p/2.jpg", "b", utc(2026, 1, 3, 10)).unwrap();
        store.create("/p/1.jpg", "a", utc(2026, 1, 1, 10)).unwrap();

        assert_eq!(store.latest_created_at().unwrap(), Some(utc(2026, 1, 3, 10)));
    }

    #[test]
    fn entries_in_range_is_half_open_and_ascending() {
        let store = store();
        store.create("/p/3.jpg", "c", utc(2026, 1, 3, 0)).unwrap();
        store.create("/p/1.jpg", "a", utc(2026, 1, 1, 0)).unwrap();
        store.create("/p/2.jpg", "b", utc(2026, 1, 2, 0)).unwrap();

        let entries = store
            .entries_in_range(utc(2026, 1, 1, 0), utc(2026, 1, 3, 0))
            .unwrap();

        let contents: Vec<_> = entries.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b"]);
    }

    #[test]
    fn round_trips_entry_fields() {
        let store = store();
        let id = store.create("/p/a.jpg", "葉が増えた", utc(2026, 2, 15, 9)).unwrap();

        let entry = store.entry_by_id(id).unwrap().unwrap();
        assert_eq!(entry.image_path, "/p/a.jpg");
        assert_eq!(entry.content, "葉が増えた");
        assert_eq!(entry.created_at, utc(2026, 2, 15, 9));
        assert!(store.entry_by_id(id + 100).unwrap().is_none());
    }

    #[test]
    fn all_entries_newest_first() {
        let store = store();
        store.create("/p/1.jpg", "a", utc(2026, 1, 1, 0)).unwrap();
        store.create("/p/2.jpg", "b", utc(2026, 1, 2, 0)).unwrap();

        let entries = store.all_entries().unwrap();
        assert_eq!(entries[0].content, "b");
        assert_eq!(entries[1].content, "a");
    }

    #[test]
    fn search_matches_substring_literally() {
        let store = store();
        store.create("/p/1.jpg", "新しい芽が出ました", utc(2026, 1, 1, 0)).unwrap();
        store.create("/p/2.jpg", "花が咲いた 100%", utc(2026, 1, 2, 0)).unwrap();

        assert_eq!(store.search("芽").unwrap().len(), 1);
        assert_eq!(store.search("%").unwrap().len(), 1);
        assert!(store.search("実").unwrap().is_empty());
    }

    #[test]
    fn year_months_use_presentation_timezone() {
        let store = store();
        // 2026-01-31 16:00 UTC is February in UTC+9
        store.create("/p/1.jpg", "a", utc(2026, 1, 31, 16)).unwrap();
        store.create("/p/2.jpg", "b", utc(2025, 12, 10, 0)).unwrap();
        store.create("/p/3.jpg", "c", utc(2026, 2, 10, 0)).unwrap();

        let months = store.year_months(Timezone::default()).unwrap();
        assert_eq!(
            months,
            vec![
                YearMonth { year: 2026, month: 2 },
                YearMonth { year: 2025, month: 12 },
            ]
        );
    }

    #[test]
    fn open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("plant_log.db");

        let store = SqliteStore::open(&path).unwrap();
        store.create("/p/a.jpg", "a", utc(2026, 1, 1, 0)).unwrap();
        drop(store);

        let reopened = SqliteStore::open(&path).unwrap();
        assert!(reopened.is_processed("/p/a.jpg").unwrap());
    }
}
