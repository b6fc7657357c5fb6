//! Candidate discovery and filtering for one pass

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::core::{WorkItem, parse_capture_time};
use crate::events::{Event, EventSink};
use crate::store::EntryStore;

/// `*.jpg` files directly inside `dir`, in glob order. Unreadable entries
/// are reported and left out.
pub(crate) fn list_candidates(dir: &Path, sink: &dyn EventSink) -> Vec<PathBuf> {
    let pattern = format!(
        "{}/*.jpg",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let entries = match glob::glob(&pattern) {
        Ok(entries) => entries,
        Err(e) => {
            sink.emit(Event::ListFailed {
                error: e.to_string(),
            });
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => sink.emit(Event::ListFailed {
                error: e.to_string(),
            }),
        }
    }
    files
}

/// Drop processed, unparsable and superseded candidates, then order the
/// rest by capture time (path breaks ties).
pub(crate) fn select_work(
    candidates: Vec<PathBuf>,
    watermark: DateTime<Utc>,
    store: &dyn EntryStore,
    sink: &dyn EventSink,
) -> Vec<WorkItem> {
    let mut items = Vec::with_capacity(candidates.len());

    for path in candidates {
        let key = path.to_string_lossy().into_owned();

        match store.is_processed(&key) {
            Ok(true) => continue,
            Ok(false) => {}
            Err(e) => {
                sink.emit(Event::CheckFailed {
                    path: key,
                    error: e.to_string(),
                });
                continue;
            }
        }

        let captured_at = match parse_capture_time(&path) {
            Ok(ts) => ts,
            Err(e) => {
                sink.emit(Event::UnparsableName {
                    path: key,
                    error: e.to_string(),
                });
                continue;
            }
        };

        if captured_at <= watermark {
            sink.emit(Event::Superseded {
                path: key,
                captured_at,
            });
            continue;
        }

        items.push(WorkItem {
            image_path: path,
            captured_at,
        });
    }

    items.sort_by(|a, b| {
        a.captured_at
            .cmp(&b.captured_at)
            .then_with(|| a.image_path.cmp(&b.image_path))
    });
    items
}
