//! Runtime configuration for the vanity key search.

use std::time::Duration;

use clap::Parser;

use crate::crypto::KeyFormat;
use crate::error::ConfigError;
use crate::matcher::Prefix;
use crate::worker::{SearchParams, DEFAULT_REPORT_INTERVAL};

/// BLS12-381 Vanity Public Key Search
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Hex prefix the serialized public key must start with (e.g. 01dead01)
    pub prefix: String,

    /// Public key serialization to match: full (96 bytes) or compressed (48 bytes)
    #[arg(short = 'f', long, default_value = "full")]
    pub format: KeyFormat,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Give up after each worker derived this many keys (benchmarking)
    #[arg(short = 'm', long)]
    pub max_attempts: Option<u64>,

    /// Progress report interval in seconds (0 disables progress output)
    #[arg(short = 'r', long, default_value_t = DEFAULT_REPORT_INTERVAL.as_secs())]
    pub report_interval: u64,
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }

    pub fn report_interval(&self) -> Option<Duration> {
        (self.report_interval > 0).then(|| Duration::from_secs(self.report_interval))
    }

    /// Validates the configuration and resolves it into search parameters.
    pub fn validate(&self) -> Result<SearchParams, ConfigError> {
        let prefix = Prefix::from_hex(&self.prefix, self.format)?;

        let workers = self.worker_count();
        if workers == 0 {
            return Err(ConfigError::InvalidWorkers);
        }

        Ok(SearchParams {
            prefix,
            workers,
            max_attempts: self.max_attempts,
            report_interval: self.report_interval(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_config(prefix: &str) -> Config {
        Config {
            prefix: prefix.into(),
            format: KeyFormat::Full,
            workers: None,
            max_attempts: None,
            report_interval: 5,
        }
    }

    #[test]
    fn test_valid_prefix() {
        let params = make_test_config("01dead01").validate().unwrap();
        assert_eq!(params.prefix.as_bytes(), &[0x01, 0xde, 0xad, 0x01]);
        assert!(params.workers >= 1);
        assert_eq!(params.report_interval, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_invalid_prefix() {
        assert!(make_test_config("xyz").validate().is_err());
        assert!(make_test_config("ff").validate().is_err());
    }

    #[test]
    fn test_zero_workers() {
        let mut config = make_test_config("00");
        config.workers = Some(0);
        assert_eq!(config.validate().unwrap_err(), ConfigError::InvalidWorkers);
    }

    #[test]
    fn test_reporting_disabled() {
        let mut config = make_test_config("00");
        config.report_interval = 0;
        assert_eq!(config.validate().unwrap().report_interval, None);
    }

    #[test]
    fn test_default_report_interval() {
        let config = Config::try_parse_from(["bls-vanity", "00"]).unwrap();
        assert_eq!(config.report_interval(), Some(DEFAULT_REPORT_INTERVAL));
    }

    #[test]
    fn test_parse_args() {
        let config =
            Config::try_parse_from(["bls-vanity", "-f", "compressed", "-w", "3", "a0be"]).unwrap();
        assert_eq!(config.format, KeyFormat::Compressed);
        assert_eq!(config.worker_count(), 3);
        assert_eq!(config.validate().unwrap().prefix.to_hex(), "a0be");
    }
}
