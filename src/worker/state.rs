//! Shared state of a single search run.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

const SEARCHING: u8 = 0;
const FOUND: u8 = 1;
const CANCELLED: u8 = 2;

/// Lifecycle of a run. Leaves `Searching` at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Searching,
    Found,
    Cancelled,
}

/// Attempt counter, start time and found/cancel signal shared by every
/// worker and the progress reporter.
#[derive(Debug)]
pub struct SearchState {
    attempts: AtomicU64,
    signal: AtomicU8,
    start: Instant,
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            attempts: AtomicU64::new(0),
            signal: AtomicU8::new(SEARCHING),
            start: Instant::now(),
        }
    }

    /// Total non-matching attempts recorded so far.
    #[inline]
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn signal(&self) -> Signal {
        match self.signal.load(Ordering::Acquire) {
            SEARCHING => Signal::Searching,
            FOUND => Signal::Found,
            _ => Signal::Cancelled,
        }
    }

    #[inline]
    pub fn is_searching(&self) -> bool {
        self.signal.load(Ordering::Acquire) == SEARCHING
    }

    /// Claims the run's single result slot. Only the first caller wins.
    #[inline]
    pub(crate) fn try_mark_found(&self) -> bool {
        self.transition(FOUND)
    }

    /// Stops the run without a result. Returns false if it already ended.
    pub fn cancel(&self) -> bool {
        self.transition(CANCELLED)
    }

    fn transition(&self, to: u8) -> bool {
        self.signal
            .compare_exchange(SEARCHING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Lets code outside the pool (e.g. a Ctrl-C handler) stop a run.
///
/// The handle exists before the run's [`SearchState`] does: a request made
/// before the run starts is applied as soon as the state is attached.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<CancelSlot>);

#[derive(Debug, Default)]
struct CancelSlot {
    requested: AtomicBool,
    state: Mutex<Option<Weak<SearchState>>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the handle to the state of the run that is starting.
    pub(crate) fn attach(&self, state: &Arc<SearchState>) {
        let mut slot = lock(&self.0.state);
        *slot = Some(Arc::downgrade(state));
        if self.0.requested.load(Ordering::SeqCst) {
            state.cancel();
        }
    }

    /// Requests cancellation. Returns false if the run already ended or a
    /// request was already made.
    pub fn cancel(&self) -> bool {
        let first = !self.0.requested.swap(true, Ordering::SeqCst);
        match lock(&self.0.state).as_ref() {
            Some(state) => state.upgrade().is_some_and(|state| state.cancel()),
            None => first,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn test_single_winner() {
        let state = SearchState::new();
        let winners = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..16 {
                s.spawn(|| {
                    if state.try_mark_found() {
                        winners.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
        });

        assert_eq!(winners.load(Ordering::Relaxed), 1);
        assert_eq!(state.signal(), Signal::Found);
    }

    #[test]
    fn test_signal_is_write_once() {
        let state = SearchState::new();
        assert!(state.is_searching());
        assert!(state.cancel());
        assert!(!state.try_mark_found());
        assert!(!state.cancel());
        assert_eq!(state.signal(), Signal::Cancelled);
    }

    #[test]
    fn test_attempts_monotonic_under_contention() {
        let state = SearchState::new();

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..10_000 {
                        state.record_attempt();
                    }
                });
            }
            s.spawn(|| {
                let mut last = 0;
                for _ in 0..1_000 {
                    let now = state.attempts();
                    assert!(now >= last);
                    last = now;
                }
            });
        });

        assert_eq!(state.attempts(), 40_000);
    }

    #[test]
    fn test_cancel_handle() {
        let state = Arc::new(SearchState::new());
        let handle = CancelHandle::new();
        handle.attach(&state);
        assert!(handle.cancel());
        assert!(!handle.clone().cancel());
        assert!(!state.is_searching());
    }

    #[test]
    fn test_cancel_before_attach_applies_on_attach() {
        let handle = CancelHandle::new();
        assert!(handle.cancel());

        let state = Arc::new(SearchState::new());
        handle.attach(&state);
        assert_eq!(state.signal(), Signal::Cancelled);
    }

    #[test]
    fn test_cancel_after_run_ended() {
        let handle = CancelHandle::new();
        let state = Arc::new(SearchState::new());
        handle.attach(&state);
        assert!(state.try_mark_found());
        assert!(!handle.cancel());

        drop(state);
        assert!(!handle.cancel());
    }
}
