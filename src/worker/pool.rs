//! Worker pool coordinating one search run.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::bounded;
use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use tracing::{debug, info, warn};

use crate::crypto::{EncodedKey, KeyFormat, KeyPair};
use crate::error::{ConfigError, SearchError};
use crate::matcher::Prefix;

use super::cpu::CpuWorker;
use super::progress::ProgressReporter;
use super::state::{CancelHandle, SearchState, Signal};

/// Result of a successful vanity key search.
#[derive(Debug, Clone)]
pub struct VanityResult {
    /// The secret key (hex encoded, no 0x prefix)
    pub secret_key: String,
    /// The serialized public key (hex encoded, no 0x prefix)
    pub public_key: String,
    /// Serialization the public key was matched in
    pub format: KeyFormat,
    /// The ID of the worker that found this result
    pub worker_id: usize,
    /// Keys derived by the winning worker, including the match
    pub attempts: u64,
}

impl VanityResult {
    pub(crate) fn new(
        keypair: &KeyPair,
        encoded: EncodedKey,
        worker_id: usize,
        attempts: u64,
    ) -> Self {
        Self {
            secret_key: keypair.secret_key_hex(),
            public_key: encoded.to_hex(),
            format: encoded.format(),
            worker_id,
            attempts,
        }
    }
}

/// Validated parameters of a search run.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub prefix: Prefix,
    pub workers: usize,
    /// Per-worker bound; `None` searches until a match.
    pub max_attempts: Option<u64>,
    /// Status line cadence; `None` disables progress output.
    pub report_interval: Option<Duration>,
}

/// How a run ended.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Found(VanityResult),
    /// Every worker exhausted its attempt bound.
    NotFound,
    /// Cancelled from outside before a match.
    Interrupted,
}

/// Outcome plus the run's final statistics.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    /// Non-matching attempts recorded across all workers
    pub attempts: u64,
    pub elapsed: Duration,
    pub workers: usize,
}

impl SearchReport {
    /// Returns the average generation rate (keys per second).
    pub fn keys_per_second(&self) -> f64 {
        let elapsed = self.elapsed.as_secs_f64();
        if elapsed > 0.0 {
            self.attempts as f64 / elapsed
        } else {
            0.0
        }
    }
}

/// Runs N workers against one prefix and collects the single result.
///
/// The run's [`SearchState`] is created when [`WorkerPool::run_with`]
/// starts and dropped when it returns.
pub struct WorkerPool {
    /// Number of workers
    num_workers: usize,
    /// The prefix to search for
    prefix: Arc<Prefix>,
    max_attempts: Option<u64>,
    report_interval: Option<Duration>,
    /// Attached to the run's state once it exists
    cancel: CancelHandle,
}

impl WorkerPool {
    pub fn new(params: SearchParams) -> Self {
        Self {
            num_workers: params.workers,
            prefix: Arc::new(params.prefix),
            max_attempts: params.max_attempts,
            report_interval: params.report_interval,
            cancel: CancelHandle::new(),
        }
    }

    /// Returns a handle for stopping the run from another thread
    /// (e.g. a signal handler).
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Returns the number of workers.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Returns the prefix being searched for.
    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    /// Runs the search with one ChaCha-based `StdRng` per worker, each
    /// seeded from the operating system.
    pub fn run(self) -> Result<SearchReport, SearchError> {
        self.run_with(|_| StdRng::from_rng(OsRng))
    }

    /// Runs the search, seeding worker `id` from `make_rng(id)`.
    ///
    /// Blocks until every worker has exited. A match found before a worker
    /// failed is still returned.
    pub fn run_with<R, F>(self, mut make_rng: F) -> Result<SearchReport, SearchError>
    where
        R: RngCore + Send + 'static,
        F: FnMut(usize) -> Result<R, rand::Error>,
    {
        if self.num_workers == 0 {
            return Err(ConfigError::InvalidWorkers.into());
        }

        let state = Arc::new(SearchState::new());
        self.cancel.attach(&state);
        let (result_tx, result_rx) = bounded(1);

        let reporter = match self.report_interval {
            Some(interval) if !interval.is_zero() => Some(ProgressReporter::spawn(
                state.clone(),
                self.prefix.expected_tries(),
                interval,
            )?),
            _ => None,
        };

        info!(
            workers = self.num_workers,
            prefix = %self.prefix.to_hex(),
            format = %self.prefix.format(),
            "search started"
        );

        let mut handles: Vec<JoinHandle<Result<u64, SearchError>>> =
            Vec::with_capacity(self.num_workers);
        for id in 0..self.num_workers {
            let spawned = make_rng(id).map_err(SearchError::from).and_then(|rng| {
                let worker = CpuWorker::new(
                    id,
                    self.prefix.clone(),
                    rng,
                    state.clone(),
                    result_tx.clone(),
                    self.max_attempts,
                );
                thread::Builder::new()
                    .name(format!("bls-vanity-worker-{}", id))
                    .spawn(move || worker.run())
                    .map_err(SearchError::Spawn)
            });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    state.cancel();
                    let _ = join_all(handles);
                    return Err(err);
                }
            }
        }
        drop(result_tx);

        let first_error = join_all(handles);

        if let Some(reporter) = reporter {
            reporter.stop();
        }

        let outcome = match result_rx.try_recv() {
            Ok(result) => {
                if let Some(err) = &first_error {
                    warn!("worker failed after the match was found: {}", err);
                }
                SearchOutcome::Found(result)
            }
            Err(_) => {
                if let Some(err) = first_error {
                    return Err(err);
                }
                if state.signal() == Signal::Cancelled {
                    warn!("search interrupted");
                    SearchOutcome::Interrupted
                } else {
                    SearchOutcome::NotFound
                }
            }
        };

        Ok(SearchReport {
            outcome,
            attempts: state.attempts(),
            elapsed: state.elapsed(),
            workers: self.num_workers,
        })
    }
}

/// Joins every worker, returning the first error any of them reported.
fn join_all(handles: Vec<JoinHandle<Result<u64, SearchError>>>) -> Option<SearchError> {
    let mut first_error = None;
    for (id, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(Ok(attempts)) => debug!(worker = id, attempts, "worker joined"),
            Ok(Err(err)) => {
                first_error.get_or_insert(err);
            }
            Err(_) => {
                first_error.get_or_insert(SearchError::WorkerPanicked(id));
            }
        }
    }
    first_error
}
