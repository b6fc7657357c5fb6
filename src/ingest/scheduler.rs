//! Periodic background execution of ingestion passes

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::events::Event;

use super::Worker;

/// Cooperative stop signal shared between the caller and the worker thread.
#[derive(Debug, Clone, Default)]
pub(crate) struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn cancel(&self) {
        let (flag, cvar) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    /// Block until `deadline` or cancellation. Returns `true` if cancelled.
    pub(crate) fn wait_until(&self, deadline: Instant) -> bool {
        let (flag, cvar) = &*self.inner;
        let mut cancelled = flag.lock().unwrap_or_else(PoisonError::into_inner);
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            cancelled = cvar
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *cancelled
    }
}

/// Owner of the running worker thread.
pub(crate) struct WorkerHandle {
    join: JoinHandle<()>,
    token: CancellationToken,
}

impl WorkerHandle {
    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the worker to finish. A pass in progress runs to completion.
    pub(crate) fn wait(self) {
        if self.join.join().is_err() {
            tracing::error!("worker thread panicked");
        }
    }
}

impl Worker {
    /// Run a pass now and then once per interval until `token` is cancelled.
    pub(crate) fn start(self, token: CancellationToken) -> WorkerHandle {
        let thread_token = token.clone();
        let join = thread::spawn(move || self.run_loop(&thread_token));
        WorkerHandle { join, token }
    }

    fn run_loop(&self, token: &CancellationToken) {
        let interval = self.settings.interval;
        let mut deadline = Instant::now();

        loop {
            self.run_pass();

            deadline = next_deadline(deadline, interval, Instant::now());
            if token.wait_until(deadline) {
                break;
            }
        }

        self.sink.emit(Event::WorkerStopped);
    }
}

/// First tick after `now`; ticks missed during a long pass are skipped.
fn next_deadline(previous: Instant, interval: Duration, now: Instant) -> Instant {
    let mut next = previous + interval;
    if next <= now && !interval.is_zero() {
        let behind = now.duration_since(next);
        let skipped = behind.as_nanos() / interval.as_nanos() + 1;
        next += interval * u32::try_from(skipped).unwrap_or(u32::MAX);
    }
    next
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::{Backoff, RetryPolicy};
    use crate::events::RecordingSink;
    use crate::generator::FixedGenerator;
    use crate::ingest::WorkerSettings;
    use crate::store::SqliteStore;

    #[test]
    fn cancelled_token_stops_wait_immediately() {
        let token = CancellationToken::new();
        token.cancel();
        assert!(token.wait_until(Instant::now() + Duration::from_secs(3600)));
    }

    #[test]
    fn wait_returns_false_at_deadline() {
        let token = CancellationToken::new();
        assert!(!token.wait_until(Instant::now() + Duration::from_millis(10)));
    }

    #[test]
    fn missed_ticks_are_dropped() {
        let start = Instant::now();
        let interval = Duration::from_secs(60);

        assert_eq!(next_deadline(start, interval, start), start + interval);
        // Pass took 150s: ticks at 60s and 120s are gone, next is 180s
        assert_eq!(
            next_deadline(start, interval, start + Duration::from_secs(150)),
            start + Duration::from_secs(180)
        );
        assert_eq!(
            next_deadline(start, interval, start + Duration::from_secs(60)),
            start + Duration::from_secs(120)
        );
    }

    #[test]
    fn worker_runs_first_pass_and_stops_on_cancel() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("20260215_0900_UTC.jpg"), b"jpeg").unwrap();

        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let sink = Arc::new(RecordingSink::default());
        let worker = Worker::new(
            store.clone(),
            Arc::new(FixedGenerator::new("grew a leaf")),
            Backoff::new(RetryPolicy::default(), sink.clone()),
            sink.clone(),
            WorkerSettings {
                photos_dir: dir.path().to_path_buf(),
                interval: Duration::from_secs(3600),
                ..WorkerSettings::default()
            },
        );

        let handle = worker.start(CancellationToken::new());

        let deadline = Instant::now() + Duration::from_secs(10);
        while store.all_entries().unwrap().is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(store.all_entries().unwrap().len(), 1);

        handle.cancel();
        handle.wait();

        let events = sink.events();
        assert_eq!(events.last(), Some(&Event::WorkerStopped));
    }
}
