//! Prefix matching for serialized public keys.
//!
//! Prefixes are validated once against the chosen key format; matching
//! itself is a plain byte comparison on the hot path.

mod prefix;

pub use prefix::{matches, MatchResult, Prefix};
