//! Core module - diary types and the pure pieces of the ingestion pipeline

mod filename;
mod image;
mod prompt;
mod retry;
mod types;

pub(crate) use filename::parse_capture_time;
pub(crate) use image::read_image_file;
pub(crate) use prompt::{build_prompt, lookback_window};
pub(crate) use retry::{Backoff, RetryError, RetryPolicy};
pub(crate) use types::{DiaryEntry, PassSummary, WorkItem, YearMonth};

#[cfg(test)]
pub(crate) use prompt::BASE_PROMPT;
#[cfg(test)]
pub(crate) use retry::SleepFn;
