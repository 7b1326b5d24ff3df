//! Prefix validation and matching.

use crate::crypto::KeyFormat;
use crate::error::ConfigError;

/// Result of a prefix match operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Full match found
    Match,
    /// No match
    NoMatch,
}

impl MatchResult {
    #[inline]
    pub fn is_match(self) -> bool {
        matches!(self, MatchResult::Match)
    }
}

/// Compares the leading bytes of `serialized_key` against `prefix`.
///
/// `serialized_key` must be at least as long as `prefix`; [`Prefix`]
/// guarantees this by rejecting prefixes longer than the key format.
#[inline]
pub fn matches(serialized_key: &[u8], prefix: &[u8]) -> bool {
    debug_assert!(serialized_key.len() >= prefix.len());
    serialized_key[..prefix.len()] == *prefix
}

/// A validated byte prefix bound to the key format it is matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix {
    bytes: Vec<u8>,
    format: KeyFormat,
}

impl Prefix {
    /// Validates `bytes` as a satisfiable prefix of `format` keys.
    pub fn new(bytes: Vec<u8>, format: KeyFormat) -> Result<Self, ConfigError> {
        let first = *bytes.first().ok_or(ConfigError::EmptyPrefix)?;

        if bytes.len() > format.serialized_len() {
            return Err(ConfigError::PrefixTooLong {
                len: bytes.len(),
                max: format.serialized_len(),
                format,
            });
        }

        if !format.is_allowed_first_byte(first) {
            return Err(ConfigError::InvalidFirstByte {
                byte: first,
                format,
                allowed: format.allowed_first_bytes(),
            });
        }

        Ok(Self { bytes, format })
    }

    /// Decodes a hex string (optional `0x`, either case) and validates it.
    pub fn from_hex(hex_str: &str, format: KeyFormat) -> Result<Self, ConfigError> {
        let trimmed = hex_str.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        Self::new(hex::decode(digits)?, format)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn format(&self) -> KeyFormat {
        self.format
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Matches a serialized key against this prefix.
    #[inline]
    pub fn matches(&self, serialized_key: &[u8]) -> MatchResult {
        if matches(serialized_key, &self.bytes) {
            MatchResult::Match
        } else {
            MatchResult::NoMatch
        }
    }

    /// Expected number of attempts to find a match.
    pub fn expected_tries(&self) -> f64 {
        self.format.expected_tries(self.bytes.len())
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        let tries = self.expected_tries();
        let label = if tries <= 1e3 {
            "Very Easy (< 1 second)"
        } else if tries <= 1e5 {
            "Easy (seconds)"
        } else if tries <= 1e7 {
            "Medium (minutes)"
        } else if tries <= 1e9 {
            "Hard (hours)"
        } else {
            "Very Hard (days or more)"
        };
        format!("{} (~{:.3e} tries)", label, tries)
    }
}
