//! Key derivation and public key serialization.
//!
//! This module provides:
//! - BLS12-381 keypair derivation from a 32-byte seed
//! - The two public key encodings a prefix can be matched against

mod format;
mod keypair;

pub use format::{EncodedKey, KeyFormat, COMPRESSED_LEN, FULL_LEN};
pub use keypair::{KeyPair, Seed, SEED_LEN};
