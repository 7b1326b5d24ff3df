//! # bls_vanity
//!
//! Multi-threaded search for BLS12-381 keypairs whose serialized public
//! key starts with a chosen byte prefix.
//!
//! ## Architecture
//!
//! - `crypto`: Key derivation and public key serialization formats
//! - `matcher`: Prefix validation and matching
//! - `worker`: Parallel search, cancellation and progress reporting
//! - `config`: Runtime configuration
//! - `error`: Configuration and search errors
//! - `log`: Diagnostic logging setup

pub mod config;
pub mod crypto;
pub mod error;
pub mod log;
pub mod matcher;
pub mod worker;

pub use config::Config;
pub use crypto::{KeyFormat, KeyPair};
pub use error::{ConfigError, SearchError};
pub use matcher::{MatchResult, Prefix};
pub use worker::{SearchOutcome, SearchParams, SearchReport, VanityResult, WorkerPool};
