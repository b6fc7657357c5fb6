//! Structured pipeline events
//!
//! The ingestion components never call the logger directly. They report
//! through an [`EventSink`] handed to them at construction, which in
//! production forwards to `tracing` and in tests records every event.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    PassStarted {
        watermark: Option<DateTime<Utc>>,
        candidates: usize,
    },
    PassAborted {
        error: String,
    },
    /// The photos directory could not be listed, in whole or in part.
    ListFailed {
        error: String,
    },
    PassFinished {
        queued: usize,
        created: usize,
        failed: usize,
    },
    /// Capture time is at or before the watermark.
    Superseded {
        path: String,
        captured_at: DateTime<Utc>,
    },
    UnparsableName {
        path: String,
        error: String,
    },
    CheckFailed {
        path: String,
        error: String,
    },
    RetryScheduled {
        operation: String,
        attempt: usize,
        total: usize,
        delay: Duration,
        error: String,
    },
    RetriesExhausted {
        operation: String,
        attempts: usize,
        error: String,
    },
    EntryCreated {
        path: String,
        id: i64,
        captured_at: DateTime<Utc>,
    },
    ItemFailed {
        path: String,
        error: String,
    },
    WorkerStopped,
}

pub(crate) trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Forwards events to the global `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: Event) {
        match event {
            Event::PassStarted {
                watermark,
                candidates,
            } => match watermark {
                Some(ts) => debug!(watermark = %ts, candidates, "ingestion pass started"),
                None => debug!(candidates, "ingestion pass started with empty diary"),
            },
            Event::PassAborted { error } => {
                error!(error = %error, "ingestion pass aborted");
            }
            Event::ListFailed { error } => {
                error!(error = %error, "failed to list photos");
            }
            Event::PassFinished {
                queued,
                created,
                failed,
            } => {
                if queued > 0 {
                    info!(queued, created, failed, "ingestion pass finished");
                } else {
                    debug!("ingestion pass found no new images");
                }
            }
            Event::Superseded { path, captured_at } => {
                debug!(image = %path, captured_at = %captured_at, "image predates latest diary, ignoring");
            }
            Event::UnparsableName { path, error } => {
                warn!(image = %path, error = %error, "skipping image");
            }
            Event::CheckFailed { path, error } => {
                error!(image = %path, error = %error, "failed to check image status");
            }
            Event::RetryScheduled {
                operation,
                attempt,
                total,
                delay,
                error,
            } => {
                error!(
                    attempt,
                    total,
                    delay_ms = saturating_millis(delay),
                    error = %error,
                    "{operation} failed, retrying"
                );
            }
            Event::RetriesExhausted {
                operation,
                attempts,
                error,
            } => {
                error!(attempt = attempts, total = attempts, error = %error, "{operation} failed, no more retries");
            }
            Event::EntryCreated {
                path,
                id,
                captured_at,
            } => {
                info!(image = %path, id, captured_at = %captured_at, "diary created");
            }
            Event::ItemFailed { path, error } => {
                error!(image = %path, error = %error, "image not processed");
            }
            Event::WorkerStopped => info!("worker stopped"),
        }
    }
}

#[cfg(test)]
pub(crate) use recording::RecordingSink;


/// Whole milliseconds, clamped to `u64::MAX`.
fn saturating_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}
