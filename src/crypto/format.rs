//! Public key serialization formats for BLS12-381 G1 points.
//!
//! The first byte of a serialized G1 point carries three flag bits
//! (compression, infinity, sign) on top of the high bits of the x
//! coordinate. Because x is reduced modulo p and p's top byte is `0x1a`,
//! only a small, enumerable set of first bytes is reachable for a valid,
//! non-infinity point.

use std::fmt;
use std::str::FromStr;

use blst::min_pk::PublicKey;

/// Length of the uncompressed serialization (x || y).
pub const FULL_LEN: usize = 96;

/// Length of the compressed serialization (flags | x).
pub const COMPRESSED_LEN: usize = 48;

/// Top byte of the BLS12-381 base field modulus.
const MODULUS_TOP_BYTE: u8 = 0x1a;

const COMPRESSION_FLAG: u8 = 0x80;
const INFINITY_FLAG: u8 = 0x40;
const COORDINATE_BITS: u8 = 0x1f;

/// How a public key is serialized before it is compared against the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyFormat {
    /// 96-byte uncompressed encoding
    #[default]
    Full,
    /// 48-byte compressed encoding
    Compressed,
}

impl KeyFormat {
    /// Length in bytes of a key serialized in this format.
    #[inline]
    pub const fn serialized_len(self) -> usize {
        match self {
            KeyFormat::Full => FULL_LEN,
            KeyFormat::Compressed => COMPRESSED_LEN,
        }
    }

    /// Returns true if `byte` can be the first byte of a valid,
    /// non-infinity point in this format.
    pub fn is_allowed_first_byte(self, byte: u8) -> bool {
        let flags_ok = match self {
            // Uncompressed points carry no flags at all.
            KeyFormat::Full => byte & !COORDINATE_BITS == 0,
            // Compression bit set, infinity bit clear, sign bit free.
            KeyFormat::Compressed => byte & (COMPRESSION_FLAG | INFINITY_FLAG) == COMPRESSION_FLAG,
        };
        flags_ok && byte & COORDINATE_BITS <= MODULUS_TOP_BYTE
    }

    /// Every first-byte value reachable in this format, ascending.
    pub fn allowed_first_bytes(self) -> Vec<u8> {
        (0..=u8::MAX)
            .filter(|&b| self.is_allowed_first_byte(b))
            .collect()
    }

    /// Correction for the constrained first byte.
    ///
    /// A uniform model would expect `256^n` tries for an `n`-byte prefix, but
    /// the first byte only ranges over `allowed_first_bytes().len()` values,
    /// so the real expectation is smaller by `256 / allowed`.
    pub fn bias_factor(self) -> f64 {
        256.0 / self.allowed_first_bytes().len() as f64
    }

    /// Expected number of tries until the first match of a prefix of
    /// `prefix_len` bytes (mean of the geometric distribution).
    pub fn expected_tries(self, prefix_len: usize) -> f64 {
        let exponent = i32::try_from(prefix_len).unwrap_or(i32::MAX);
        256f64.powi(exponent) / self.bias_factor()
    }

    /// Serializes `public_key` into a stack buffer.
    #[inline]
    pub fn encode(self, public_key: &PublicKey) -> EncodedKey {
        match self {
            KeyFormat::Full => EncodedKey {
                bytes: public_key.serialize(),
                format: self,
            },
            KeyFormat::Compressed => {
                let mut bytes = [0u8; FULL_LEN];
                bytes[..COMPRESSED_LEN].copy_from_slice(&public_key.compress());
                EncodedKey {
                    bytes,
                    format: self,
                }
            }
        }
    }
}

impl FromStr for KeyFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" | "uncompressed" | "serialized" => Ok(KeyFormat::Full),
            "compressed" | "compact" => Ok(KeyFormat::Compressed),
            _ => Err(format!("Unknown key format: {}", s)),
        }
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyFormat::Full => write!(f, "full"),
            KeyFormat::Compressed => write!(f, "compressed"),
        }
    }
}

/// A serialized public key, sized for the larger of the two formats.
#[derive(Clone, Copy)]
pub struct EncodedKey {
    bytes: [u8; FULL_LEN],
    format: KeyFormat,
}

impl EncodedKey {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.format.serialized_len()]
    }

    pub fn format(&self) -> KeyFormat {
        self.format
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }
}

impl fmt::Debug for EncodedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedKey({})", self.to_hex())
    }
}
