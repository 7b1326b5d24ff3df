//! CPU worker for the vanity key search.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::Sender;
use rand::RngCore;
use tracing::{debug, error, info};

use crate::crypto::{KeyPair, Seed, SEED_LEN};
use crate::error::SearchError;
use crate::matcher::Prefix;

use super::{SearchState, VanityResult};

/// A CPU worker that derives keypairs from random seeds and tests them
/// against the prefix.
pub struct CpuWorker<R> {
    /// Worker ID
    id: usize,
    /// The prefix to match against
    prefix: Arc<Prefix>,
    /// Seed source
    rng: R,
    /// Shared counter and found/cancel signal
    state: Arc<SearchState>,
    /// Channel for the winning result
    result_tx: Sender<VanityResult>,
    /// Per-worker attempt bound (benchmarks and tests)
    max_attempts: Option<u64>,
}

impl<R: RngCore> CpuWorker<R> {
    /// Creates a new CPU worker.
    pub fn new(
        id: usize,
        prefix: Arc<Prefix>,
        rng: R,
        state: Arc<SearchState>,
        result_tx: Sender<VanityResult>,
        max_attempts: Option<u64>,
    ) -> Self {
        Self {
            id,
            prefix,
            rng,
            state,
            result_tx,
            max_attempts,
        }
    }

    /// Runs the worker loop and returns the number of keys it derived.
    ///
    /// Stops when:
    /// - this worker wins the found signal
    /// - another worker found a match or the run was cancelled
    /// - the attempt bound is exhausted
    ///
    /// A failing seed source or key derivation cancels the whole run.
    pub fn run(mut self) -> Result<u64, SearchError> {
        let _guard = CancelOnPanic(&self.state);
        let format = self.prefix.format();
        let mut seed: Seed = [0u8; SEED_LEN];
        let mut attempts = 0u64;

        debug!(worker = self.id, "worker started");

        while self.state.is_searching() {
            if self.max_attempts.is_some_and(|max| attempts >= max) {
                break;
            }

            self.rng
                .try_fill_bytes(&mut seed)
                .map_err(|e| self.abort(e.into()))?;
            let keypair = KeyPair::derive(&seed).map_err(|e| self.abort(e))?;
            attempts += 1;

            let encoded = keypair.encode(format);
            if self.prefix.matches(encoded.as_bytes()).is_match() {
                if self.state.try_mark_found() {
                    let result = VanityResult::new(&keypair, encoded, self.id, attempts);
                    info!(
                        worker = self.id,
                        attempts,
                        public_key = %result.public_key,
                        "match found"
                    );
                    // Capacity 1 and a single winner: this cannot be full.
                    let _ = self.result_tx.try_send(result);
                }
                break;
            }

            self.state.record_attempt();
        }

        debug!(worker = self.id, attempts, "worker stopped");
        Ok(attempts)
    }

    fn abort(&self, err: SearchError) -> SearchError {
        error!(worker = self.id, "{}", err);
        self.state.cancel();
        err
    }
}

/// Cancels the run if the worker thread unwinds, so peers do not spin
/// while the pool waits to join them.
struct CancelOnPanic<'a>(&'a SearchState);

impl Drop for CancelOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyFormat;
    use crate::worker::Signal;
    use crossbeam_channel::bounded;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn worker(
        prefix: &str,
        seed: u64,
        max_attempts: Option<u64>,
    ) -> (
        CpuWorker<StdRng>,
        Arc<SearchState>,
        crossbeam_channel::Receiver<VanityResult>,
    ) {
        let prefix = Arc::new(Prefix::from_hex(prefix, KeyFormat::Full).unwrap());
        let state = Arc::new(SearchState::new());
        let (tx, rx) = bounded(1);
        let worker = CpuWorker::new(
            0,
            prefix,
            StdRng::seed_from_u64(seed),
            state.clone(),
            tx,
            max_attempts,
        );
        (worker, state, rx)
    }

    #[test]
    fn test_bounded_worker_counts_every_miss() {
        let (worker, state, rx) = worker("00ffffffff", 1, Some(50));
        assert_eq!(worker.run().unwrap(), 50);
        assert_eq!(state.attempts(), 50);
        assert_eq!(state.signal(), Signal::Searching);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_worker_publishes_match() {
        let (worker, state, rx) = worker("00", 5, Some(10_000));
        let attempts = worker.run().unwrap();

        let result = rx.try_recv().unwrap();
        assert!(result.public_key.starts_with("00"));
        assert_eq!(result.attempts, attempts);
        assert_eq!(state.signal(), Signal::Found);
        // the matching attempt itself is not counted
        assert_eq!(state.attempts(), attempts - 1);
    }

    #[test]
    fn test_worker_exits_when_already_stopped() {
        let (worker, state, rx) = worker("00", 3, None);
        state.cancel();
        assert_eq!(worker.run().unwrap(), 0);
        assert_eq!(state.attempts(), 0);
        assert!(rx.try_recv().is_err());
    }
}
