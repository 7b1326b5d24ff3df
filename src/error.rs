//! Error types for the vanity key search.

use thiserror::Error;

use crate::crypto::KeyFormat;

/// Problems with the requested search, detected before any worker starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Invalid prefix: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Prefix cannot be empty")]
    EmptyPrefix,

    #[error("Prefix is {len} bytes but a {format} key is only {max} bytes long")]
    PrefixTooLong {
        len: usize,
        max: usize,
        format: KeyFormat,
    },

    #[error("First byte 0x{byte:02x} never appears in a {format} public key")]
    InvalidFirstByte {
        byte: u8,
        format: KeyFormat,
        allowed: Vec<u8>,
    },

    #[error("Worker count must be at least 1")]
    InvalidWorkers,
}

/// Errors that abort a search run.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Random source failed: {0}")]
    RandomSource(#[from] rand::Error),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Failed to spawn thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),
}

pub type Result<T> = std::result::Result<T, SearchError>;
