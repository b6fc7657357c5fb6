//! Photo ingestion
//!
//! A [`Worker`] owns everything a pass needs. [`Worker::run_pass`] does a
//! single scan; [`Worker::start`] moves the worker onto its own thread and
//! repeats the scan on a fixed interval until cancelled.

mod scan;
mod scheduler;
mod worker;

pub(crate) use scheduler::CancellationToken;
pub(crate) use worker::{DEFAULT_INTERVAL, Worker, WorkerSettings};
