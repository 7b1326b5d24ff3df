//! Periodic throughput and time-to-match reporting.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use tracing::debug;

use crate::error::SearchError;

use super::SearchState;

/// Default interval between status lines.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// One status line worth of progress figures.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub elapsed: Duration,
    pub attempts: u64,
    /// Attempts per second, `None` while still warming up.
    pub throughput: Option<f64>,
    /// Expected attempts until a match. The geometric distribution is
    /// memoryless, so this does not shrink as attempts accumulate.
    pub expected_tries: f64,
    /// Estimated seconds until a match, `None` while throughput is unknown.
    pub remaining_secs: Option<f64>,
    /// Chance that a match would have turned up by now.
    pub probability: f64,
}

impl ProgressSnapshot {
    pub fn compute(attempts: u64, elapsed: Duration, expected_tries: f64) -> Self {
        let secs = elapsed.as_secs_f64();
        let throughput = if secs < 1.0 {
            None
        } else {
            Some(attempts as f64 / secs).filter(|rate| rate.round() > 0.0)
        };

        Self {
            elapsed,
            attempts,
            throughput,
            expected_tries,
            remaining_secs: throughput.map(|rate| expected_tries / rate),
            probability: match_probability(attempts, expected_tries),
        }
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spent = self.elapsed.as_secs();
        match (self.throughput, self.remaining_secs) {
            (Some(rate), Some(remaining)) => write!(
                f,
                "[{:>4}s] tries per sec: {} | expected wait: {} | time spent: {} | tried: {} ({:.1}% chance by now)",
                spent,
                format_number(rate as u64),
                format_duration(remaining),
                format_duration(spent as f64),
                format_number(self.attempts),
                self.probability * 100.0
            ),
            _ => write!(
                f,
                "[{:>4}s] tries per sec: computing... | time spent: {} | tried: {}",
                spent,
                format_duration(spent as f64),
                format_number(self.attempts)
            ),
        }
    }
}

/// Probability of at least one match in `attempts` independent tries.
fn match_probability(attempts: u64, expected_tries: f64) -> f64 {
    if expected_tries <= 1.0 {
        return if attempts > 0 { 1.0 } else { 0.0 };
    }
    let per_try = (-1.0 / expected_tries).ln_1p();
    -(attempts as f64 * per_try).exp_m1()
}

/// Background thread printing a [`ProgressSnapshot`] every interval until
/// stopped or dropped.
pub struct ProgressReporter {
    handle: Option<JoinHandle<()>>,
    shutdown_tx: Option<Sender<()>>,
}

impl ProgressReporter {
    pub fn spawn(
        state: Arc<SearchState>,
        expected_tries: f64,
        interval: Duration,
    ) -> Result<Self, SearchError> {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("bls-vanity-progress".into())
            .spawn(move || loop {
                match shutdown_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let snapshot =
                            ProgressSnapshot::compute(state.attempts(), state.elapsed(), expected_tries);
                        println!("{}", snapshot);
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(SearchError::Spawn)?;

        Ok(Self {
            handle: Some(handle),
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Stops the reporter and waits for its thread.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender disconnects the channel and wakes the thread.
        self.shutdown_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                debug!("progress reporter panicked");
            }
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Formats a count with K/M/B suffixes.
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Formats seconds as `1d2h3m4s`, switching to years for long waits.
pub fn format_duration(secs: f64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;
    const YEAR: f64 = 365.25 * DAY as f64;

    if !secs.is_finite() || secs >= 1000.0 * YEAR {
        return format!("{:.2e} years", secs / YEAR);
    }
    if secs >= YEAR {
        return format!("{:.1} years", secs / YEAR);
    }

    let total = secs.max(0.0) as u64;
    let (days, rest) = (total / DAY, total % DAY);
    let (hours, rest) = (rest / HOUR, rest % HOUR);
    let (minutes, seconds) = (rest / MINUTE, rest % MINUTE);

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{}d", days));
    }
    if days > 0 || hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    out.push_str(&format!("{}s", seconds));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_throughput_converges_to_rate() {
        let rate = 12_345u64;
        let expected = 27.0 * 256.0 * 256.0;

        for interval in 1..=4u64 {
            let elapsed = Duration::from_secs(5 * interval);
            let snapshot = ProgressSnapshot::compute(rate * 5 * interval, elapsed, expected);
            let measured = snapshot.throughput.unwrap();
            assert!((measured - rate as f64).abs() < 1e-6, "{}", measured);

            let remaining = snapshot.remaining_secs.unwrap();
            assert!((remaining - expected / rate as f64).abs() < 1e-6);
        }
    }

    #[test]
    fn test_computing_before_first_second() {
        let snapshot = ProgressSnapshot::compute(500, Duration::from_millis(900), 27.0);
        assert_eq!(snapshot.throughput, None);
        assert_eq!(snapshot.remaining_secs, None);
        assert!(snapshot.to_string().contains("computing"));
    }

    #[test]
    fn test_computing_when_rate_rounds_to_zero() {
        let snapshot = ProgressSnapshot::compute(2, Duration::from_secs(10), 1e9);
        assert_eq!(snapshot.throughput, None);
        assert!(snapshot.to_string().contains("computing"));
    }

    #[test]
    fn test_match_probability() {
        assert_eq!(match_probability(0, 27.0), 0.0);
        let p = match_probability(27, 27.0);
        // 1 - (26/27)^27 ~ 0.64
        assert!((p - 0.6386).abs() < 1e-3, "{}", p);
        assert!(match_probability(1_000_000, 1e30) < 1e-20);
        assert!(match_probability(1_000_000, 1e30) > 0.0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0s");
        assert_eq!(format_duration(59.9), "59s");
        assert_eq!(format_duration(3_725.0), "1h2m5s");
        assert_eq!(format_duration(90_061.0), "1d1h1m1s");
        assert!(format_duration(3.0e9).ends_with("years"));
        assert!(format_duration(f64::INFINITY).ends_with("years"));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_500), "1.50K");
        assert_eq!(format_number(2_000_000), "2.00M");
        assert_eq!(format_number(3_000_000_000), "3.00B");
    }

    #[test]
    fn test_reporter_stops_promptly() {
        let state = Arc::new(SearchState::new());
        let reporter =
            ProgressReporter::spawn(state, 27.0, Duration::from_secs(3600)).unwrap();
        let start = Instant::now();
        reporter.stop();
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
