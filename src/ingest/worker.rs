use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::core::{Backoff, PassSummary, WorkItem, build_prompt, lookback_window, read_image_file};
use crate::error::ItemError;
use crate::events::{Event, EventSink};
use crate::generator::{DiaryGenerator, generate_diary};
use crate::store::EntryStore;
use crate::utils::Timezone;

use super::scan::{list_candidates, select_work};

pub(crate) const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub(crate) struct WorkerSettings {
    pub(crate) photos_dir: PathBuf,
    pub(crate) interval: Duration,
    pub(crate) timezone: Timezone,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            photos_dir: PathBuf::from(crate::consts::DEFAULT_PHOTOS_DIR),
            interval: DEFAULT_INTERVAL,
            timezone: Timezone::default(),
        }
    }
}

/// Turns new photos into diary entries, one pass at a time.
pub(crate) struct Worker {
    pub(super) store: Arc<dyn EntryStore>,
    pub(super) generator: Arc<dyn DiaryGenerator>,
    pub(super) backoff: Backoff,
    pub(super) sink: Arc<dyn EventSink>,
    pub(super) settings: WorkerSettings,
}

impl Worker {
    pub(crate) fn new(
        store: Arc<dyn EntryStore>,
        generator: Arc<dyn DiaryGenerator>,
        backoff: Backoff,
        sink: Arc<dyn EventSink>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            store,
            generator,
            backoff,
            sink,
            settings,
        }
    }

    /// Scan the photos directory once and process every new image in
    /// capture order. Per-image failures are reported and skipped.
    pub(crate) fn run_pass(&self) -> PassSummary {
        let mut summary = PassSummary::default();

        let watermark = match self.store.latest_created_at() {
            Ok(latest) => latest.unwrap_or(DateTime::<Utc>::MIN_UTC),
            Err(e) => {
                self.sink.emit(Event::PassAborted {
                    error: format!("failed to read latest diary time: {e}"),
                });
                return summary;
            }
        };

        let candidates = list_candidates(&self.settings.photos_dir, self.sink.as_ref());
        summary.candidates = candidates.len();
        self.sink.emit(Event::PassStarted {
            watermark: (watermark != DateTime::<Utc>::MIN_UTC).then_some(watermark),
            candidates: summary.candidates,
        });

        let items = select_work(candidates, watermark, self.store.as_ref(), self.sink.as_ref());
        summary.queued = items.len();

        for item in &items {
            match self.process_item(item) {
                Ok(id) => {
                    summary.created += 1;
                    self.sink.emit(Event::EntryCreated {
                        path: item.key(),
                        id,
                        captured_at: item.captured_at,
                    });
                }
                Err(e) => {
                    summary.failed += 1;
                    self.sink.emit(Event::ItemFailed {
                        path: item.key(),
                        error: e.to_string(),
                    });
                }
            }
        }

        self.sink.emit(Event::PassFinished {
            queued: summary.queued,
            created: summary.created,
            failed: summary.failed,
        });
        summary
    }

    fn process_item(&self, item: &WorkItem) -> Result<i64, ItemError> {
        read_image_file(&item.image_path)?;

        let timezone = self.settings.timezone;
        let (start, end) = lookback_window(item.captured_at, timezone);
        let past = self
            .store
            .entries_in_range(start, end)
            .map_err(ItemError::History)?;
        let prompt = build_prompt(&past, timezone);

        let key = item.key();
        let content = self
            .backoff
            .execute(&format!("generate diary for {key}"), || {
                generate_diary(self.generator.as_ref(), &item.image_path, &prompt)
            })?;

        self.store
            .create(&key, &content, item.captured_at)
            .map_err(ItemError::Persist)
    }
}
